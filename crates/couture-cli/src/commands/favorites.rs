use anyhow::{Result, bail};

use couture_core::config::AppConfig;
use couture_core::image::ImageRef;

pub async fn list(config: &AppConfig) -> Result<()> {
    let favorites = super::favorites(config).await?;
    let items = favorites.list().await;

    if items.is_empty() {
        println!("No favorites saved.");
        return Ok(());
    }
    for (i, reference) in items.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}",
            i + 1,
            reference.mime_type().unwrap_or("unknown"),
            reference.short()
        );
    }
    Ok(())
}

/// Removes by 1-based list number, or by unique reference prefix.
pub async fn remove(config: &AppConfig, selector: &str) -> Result<()> {
    let favorites = super::favorites(config).await?;
    let items = favorites.list().await;

    let target = select(&items, selector)?;
    if !favorites.remove(&target).await {
        bail!("Failed to remove favorite {}", target.short());
    }
    println!("Removed {}", target.short());
    Ok(())
}

pub async fn clear(config: &AppConfig) -> Result<()> {
    let favorites = super::favorites(config).await?;
    let total = favorites.list().await.len();
    let removed = favorites.clear().await;
    println!("Removed {removed} of {total} favorite(s)");
    if removed < total {
        bail!("Some favorites could not be removed");
    }
    Ok(())
}

fn select(items: &[ImageRef], selector: &str) -> Result<ImageRef> {
    if let Ok(number) = selector.parse::<usize>() {
        return match number.checked_sub(1).and_then(|i| items.get(i)) {
            Some(reference) => Ok(reference.clone()),
            None => bail!("No favorite number {number}"),
        };
    }

    let matches: Vec<&ImageRef> = items
        .iter()
        .filter(|r| r.as_str().starts_with(selector))
        .collect();
    match matches.as_slice() {
        [single] => Ok((*single).clone()),
        [] => bail!("No favorite matches '{selector}'"),
        _ => bail!("'{selector}' matches {} favorites", matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_number_and_prefix() {
        let items = vec![
            ImageRef::from("data:image/png;base64,AAAA"),
            ImageRef::from("data:image/png;base64,BBBB"),
        ];

        assert_eq!(select(&items, "2").unwrap(), items[1]);
        assert!(select(&items, "0").is_err());
        assert!(select(&items, "3").is_err());
        assert_eq!(select(&items, "data:image/png;base64,A").unwrap(), items[0]);
        assert!(select(&items, "data:image/png").is_err());
        assert!(select(&items, "https://").is_err());
    }
}
