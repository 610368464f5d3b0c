// Runs the whole pipeline against Simons CMAP.
//
//   CMAP_API_KEY=... RUST_LOG=info cargo run --example run_pipeline -- [data_dir] [catalog.json]
use cyano_colocalize::{Catalog, CmapClient, CyanoColocalizer, CyanoError, Settings};
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() {
    env_logger::init();
    configure_polars_display();

    if let Err(e) = run().await {
        eprintln!("Pipeline failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CyanoError> {
    let mut args = env::args().skip(1);
    let data_dir = args.next().unwrap_or_else(|| "./data".to_string());
    let catalog = match args.next() {
        Some(path) => Catalog::from_json_file(Path::new(&path))?,
        None => Catalog::default(),
    };

    let pipeline = CyanoColocalizer::builder()
        .backend(CmapClient::from_env()?)
        .catalog(catalog)
        .settings(Settings::default().with_data_dir(&data_dir))
        .build();

    let compiled = pipeline.run().await?;
    println!("{}", compiled.head(Some(10)));
    println!(
        "Compiled {} observations into {}",
        compiled.height(),
        pipeline.settings().compiled_file().display()
    );
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
}
