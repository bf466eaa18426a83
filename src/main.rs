use sales_ingest::Outcome;

fn main() {
    match sales_ingest::run() {
        Ok(Outcome::Accepted) => {}
        Ok(Outcome::Rejected) => std::process::exit(2),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
