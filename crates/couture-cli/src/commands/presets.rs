use couture_core::catalog::StylingCatalog;
use couture_core::config::AppConfig;

pub fn run(config: &AppConfig) {
    let catalog = StylingCatalog::from_config(&config.styling);

    println!("Seasons:");
    for season in catalog.seasons() {
        println!("  {season}");
    }
    println!("Occasions:");
    for occasion in catalog.occasions() {
        println!("  {occasion}");
    }
}
