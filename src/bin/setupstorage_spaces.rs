use clap::Parser;
use spaces_store::config::server_config::READ_OP;
use spaces_store::config::SetupArgs;
use spaces_store::setup;
use spaces_store::utils::logger;
use spaces_store::ErrorKind;

fn main() {
    let args = SetupArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    if let Err(e) = setup::run(&args) {
        tracing::error!("❌ {}", e);
        eprintln!("upspin setupstorage-spaces: {}", e);
        if e.kind() == ErrorKind::Io && e.op() == READ_OP {
            eprintln!("💡 Run 'upspin setupdomain' first to create the server configuration.");
        }
        std::process::exit(e.exit_code());
    }
}
