//! Naming policy
//!
//! Turns an uploaded file's original name into the public stored name and
//! derives the remote (fingerprint) name the static host receives:
//! `<base><unix_timestamp>.<declared_size>x<max_size>.<suffix>`.
//! Downstream consumers parse that layout, so it must stay byte-exact.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use assetsync_core::constants::REMOTE_NAME_SUFFIX;
use assetsync_core::models::upload::{base_name, strip_directories};
use assetsync_core::RemoteSuffix;
use uuid::Uuid;

/// Source of the timestamp embedded in remote names
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Source of collision-resistant identifiers, lowercase `[a-z0-9]+`
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// UUIDv7 rendered as 32 lowercase hex digits: millisecond time prefix plus random bits
pub struct TimeOrderedIds;

impl IdGenerator for TimeOrderedIds {
    fn next_id(&self) -> String {
        Uuid::now_v7().simple().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NameFlags {
    pub unique: bool,
    pub translit: bool,
}

pub struct NamePolicy {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    remote_suffix: RemoteSuffix,
}

impl NamePolicy {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>, remote_suffix: RemoteSuffix) -> Self {
        Self {
            ids,
            clock,
            remote_suffix,
        }
    }

    /// Policy backed by the wall clock and UUIDv7 identifiers
    pub fn system(remote_suffix: RemoteSuffix) -> Self {
        Self::new(Arc::new(TimeOrderedIds), Arc::new(SystemClock), remote_suffix)
    }

    /// Stored name for an upload.
    ///
    /// `unique` wins over `translit`; both need a non-empty extension. With
    /// neither, the original name is kept minus any directory components.
    pub fn public_name(&self, original: &str, extension: &str, flags: NameFlags) -> String {
        let original = strip_directories(original);

        if flags.unique && !extension.is_empty() {
            format!("{}.{}", self.ids.next_id(), extension)
        } else if flags.translit && !extension.is_empty() {
            format!("{}.{}", slug(base_name(original)), extension)
        } else {
            original.to_string()
        }
    }

    /// Fingerprint name the file is synced under
    pub fn remote_name(&self, current: &str, declared_size: u64, max_size: u64) -> String {
        let base = base_name(current);
        let suffix = match self.remote_suffix {
            RemoteSuffix::Png => REMOTE_NAME_SUFFIX,
            RemoteSuffix::Keep => match current.rsplit_once('.') {
                Some((_, ext)) if !ext.is_empty() => ext,
                _ => REMOTE_NAME_SUFFIX,
            },
        };

        if self.remote_suffix == RemoteSuffix::Png && !current.to_lowercase().ends_with(".png") {
            tracing::debug!(
                name = %current,
                "Remote name forced to .png regardless of content type"
            );
        }

        format!(
            "{}{}.{}x{}.{}",
            base,
            self.clock.unix_timestamp(),
            declared_size,
            max_size,
            suffix
        )
    }
}

/// URL-safe ASCII slug: transliterated, lowercase, runs of anything else
/// collapsed to a single `-`. Falls back to `file` when nothing survives.
pub fn slug(input: &str) -> String {
    let ascii = deunicode::deunicode(input).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "file".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn unix_timestamp(&self) -> u64 {
            self.0
        }
    }

    struct SequentialIds(AtomicU64);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            format!("id{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn policy(suffix: RemoteSuffix) -> NamePolicy {
        NamePolicy::new(
            Arc::new(SequentialIds(AtomicU64::new(1))),
            Arc::new(FixedClock(1_700_000_000)),
            suffix,
        )
    }

    const UNIQUE: NameFlags = NameFlags {
        unique: true,
        translit: false,
    };
    const TRANSLIT: NameFlags = NameFlags {
        unique: false,
        translit: true,
    };

    #[test]
    fn test_unique_names_are_lowercase_alnum_and_distinct() {
        let policy = NamePolicy::system(RemoteSuffix::Png);

        let first = policy.public_name("Photo.JPG", "jpg", UNIQUE);
        let second = policy.public_name("Photo.JPG", "jpg", UNIQUE);

        assert_ne!(first, second);
        for name in [&first, &second] {
            let (id, ext) = name.split_once('.').unwrap();
            assert_eq!(ext, "jpg");
            assert!(!id.is_empty());
            assert!(id
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_unique_ignores_translit() {
        let flags = NameFlags {
            unique: true,
            translit: true,
        };
        assert_eq!(
            policy(RemoteSuffix::Png).public_name("Mon Fichier.jpg", "jpg", flags),
            "id1.jpg"
        );
    }

    #[test]
    fn test_unique_without_extension_keeps_original() {
        assert_eq!(
            policy(RemoteSuffix::Png).public_name("README", "", UNIQUE),
            "README"
        );
    }

    #[test]
    fn test_translit_slug() {
        let policy = policy(RemoteSuffix::Png);
        assert_eq!(
            policy.public_name("Mon Fichier.jpg", "jpg", TRANSLIT),
            "mon-fichier.jpg"
        );
        assert_eq!(
            policy.public_name("Привет, мир!.png", "png", TRANSLIT),
            "privet-mir.png"
        );
    }

    #[test]
    fn test_translit_empty_slug_falls_back() {
        assert_eq!(
            policy(RemoteSuffix::Png).public_name("!!!.png", "png", TRANSLIT),
            "file.png"
        );
    }

    #[test]
    fn test_plain_name_strips_directories() {
        assert_eq!(
            policy(RemoteSuffix::Png).public_name(
                "../../Mon Fichier.jpg",
                "jpg",
                NameFlags::default()
            ),
            "Mon Fichier.jpg"
        );
    }

    #[test]
    fn test_remote_name_layout() {
        assert_eq!(
            policy(RemoteSuffix::Png).remote_name("abc123.jpg", 5120, 10_485_760),
            "abc1231700000000.5120x10485760.png"
        );
    }

    #[test]
    fn test_remote_name_keeps_extension_when_configured() {
        assert_eq!(
            policy(RemoteSuffix::Keep).remote_name("report.pdf", 42, 100),
            "report1700000000.42x100.pdf"
        );
    }

    #[test]
    fn test_remote_name_without_dot_uses_whole_name() {
        assert_eq!(
            policy(RemoteSuffix::Png).remote_name("README", 1, 2),
            "README1700000000.1x2.png"
        );
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("  Hello   World  "), "hello-world");
        assert_eq!(slug("Ünïcödé_File"), "unicode-file");
        assert_eq!(slug(""), "file");
    }
}
