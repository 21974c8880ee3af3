use clap::Parser;

#[derive(Parser)]
#[command(name = "blockscript", about = "Block DSL → JavaScript compile service", version)]
struct Args {
    /// Port to listen on (0 picks a free port)
    #[arg(long, default_value_t = 7180)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = blockscript::api::serve(args.port).await {
        eprintln!("[blockscript] {e}");
        std::process::exit(1);
    }
}
