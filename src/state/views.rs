/// Read-only projections over a catalog snapshot
///
/// None of these mutate the catalog; they borrow items from the snapshot.

use super::data::MediaItem;

/// Items marked as favorite, in catalog order
pub fn favorites_only(items: &[MediaItem]) -> Vec<&MediaItem> {
    items.iter().filter(|item| item.favorite).collect()
}

/// Items that have been played, most recently played first
pub fn recently_played(items: &[MediaItem]) -> Vec<&MediaItem> {
    let mut played: Vec<&MediaItem> =
        items.iter().filter(|item| item.last_played.is_some()).collect();
    played.sort_by(|a, b| b.last_played.cmp(&a.last_played));
    played
}

/// Case-insensitive substring match over title and format tag.
/// A blank query matches everything.
pub fn search<'a>(items: &'a [MediaItem], query: &str) -> Vec<&'a MediaItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            item.title.to_lowercase().contains(&needle)
                || item
                    .format()
                    .map(|format| format.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::MediaMetadata;
    use chrono::{Duration, Utc};

    fn item(title: &str, format: &str) -> MediaItem {
        let mut item = MediaItem::new(title);
        item.metadata = Some(MediaMetadata {
            format: format.to_string(),
            ..MediaMetadata::default()
        });
        item
    }

    #[test]
    fn test_favorites_only() {
        let mut items = vec![item("a", "mp4"), item("b", "mp4"), item("c", "mp4")];
        items[1].favorite = true;

        let favorites = favorites_only(&items);
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title, "b");
    }

    #[test]
    fn test_recently_played_orders_and_excludes_unplayed() {
        let now = Utc::now();
        let mut items = vec![item("never", "mp4"), item("older", "mp4"), item("newer", "mp4")];
        items[1].last_played = Some(now - Duration::minutes(5));
        items[2].last_played = Some(now);

        let titles: Vec<_> = recently_played(&items).iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[test]
    fn test_search_matches_title_and_format() {
        let items = vec![
            item("Holiday Trip", "video/mp4"),
            item("Podcast", "audio/mpeg"),
            item("Notes", "wav"),
        ];

        let by_title: Vec<_> = search(&items, "holiday").iter().map(|i| i.title.as_str()).collect();
        assert_eq!(by_title, vec!["Holiday Trip"]);

        let by_format: Vec<_> = search(&items, "AUDIO").iter().map(|i| i.title.as_str()).collect();
        assert_eq!(by_format, vec!["Podcast"]);

        assert_eq!(search(&items, "  ").len(), 3);
        assert!(search(&items, "zzz").is_empty());
    }
}
