use clap::Parser;
use nearby::app::{AppError, NearbyApp};

fn main() -> Result<(), AppError> {
    env_logger::init();
    let args = NearbyApp::parse();
    args.op.run()
}
