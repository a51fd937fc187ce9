use move_input_helper::config::Config;
use move_input_helper::web;
use move_input_helper::MoveCatalog;
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    SimpleLogger::new().with_level(config.log_level).env().init()?;

    // The catalog is read once and shared by every worker for the process lifetime
    let catalog = match MoveCatalog::load(&config.moves_csv) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("cannot start without the move table: {}", e);
            return Err(e.into());
        }
    };

    println!("Access the single-action form at http://localhost:{}/", config.port);
    println!("Access the multi-action form at http://localhost:{}/multi", config.port);

    web::start_server(config, catalog).await?;
    Ok(())
}
