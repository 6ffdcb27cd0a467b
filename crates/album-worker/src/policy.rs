use album_core::models::PhotoRecord;
use album_core::SkipPolicy;

/// Whether a photo already has a thumbnail under the given skip policy.
pub fn is_processed(record: &PhotoRecord, policy: SkipPolicy) -> bool {
    match policy {
        SkipPolicy::Presence => record.has_thumbnail(),
        SkipPolicy::PathPattern => record.has_derived_thumbnail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_policy() {
        let photo = PhotoRecord::new("p1", "https://host/a.jpg");
        assert!(!is_processed(&photo, SkipPolicy::Presence));
        assert!(is_processed(
            &photo.clone().with_thumbnail("https://cdn/a_small.jpg"),
            SkipPolicy::Presence
        ));
        assert!(!is_processed(&photo.with_thumbnail(""), SkipPolicy::Presence));
    }

    #[test]
    fn test_path_policy_requires_thumbnail_prefix() {
        let photo = PhotoRecord::new("p1", "https://host/a.jpg");
        assert!(!is_processed(
            &photo.clone().with_thumbnail("https://cdn/a_small.jpg"),
            SkipPolicy::PathPattern
        ));
        assert!(is_processed(
            &photo.with_thumbnail("https://host/storage/v1/object/public/photos/thumbnails/p1.jpg"),
            SkipPolicy::PathPattern
        ));
    }
}
