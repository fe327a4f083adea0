use azure_egress_audit::policy::PolicyVersion;
use azure_egress_audit::{audit_snapshot, output};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default()).expect("Error initializing log4rs");
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    match std::env::args().nth(1).as_deref() {
        None => run(PolicyVersion::Refined)?,
        Some("both") => {
            run(PolicyVersion::Legacy)?;
            run(PolicyVersion::Refined)?;
        }
        Some(arg) => run(arg.parse::<PolicyVersion>()?)?,
    }

    Ok(())
}

fn run(policy: PolicyVersion) -> Result<(), Box<dyn Error>> {
    let classification = audit_snapshot(None, policy)?;
    output::print_verdicts_csv(&classification);
    output::print_summary(&classification);
    Ok(())
}
