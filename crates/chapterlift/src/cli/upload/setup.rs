//! Upload setup: input discovery, config overrides, backend wiring.

use chapterlift_core::pipeline::DiscoveredFile;
use chapterlift_core::{Chapterlift, ChapterDiscovery, Config, TransformConfig};

use super::UploadArgs;

/// Everything `run_upload` needs.
pub(crate) struct UploadContext {
    pub lift: Chapterlift,
    pub transform: TransformConfig,
}

/// Expand the inputs into one ordered page list.
///
/// Directories contribute their pages in natural order; files are taken as
/// given. Argument order is kept across inputs.
pub fn collect_pages(args: &UploadArgs, config: &Config) -> anyhow::Result<Vec<DiscoveredFile>> {
    let discovery = ChapterDiscovery::new(config.processing.clone());
    let mut pages = Vec::new();

    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                input
            );
        }
        if input.is_dir() {
            tracing::debug!("Chapter: {}", ChapterDiscovery::chapter_title(input));
        }
        let files = discovery.discover(input);
        if files.is_empty() {
            tracing::warn!("No supported images in {:?}", input);
        }
        pages.extend(files);
    }

    Ok(pages)
}

/// Apply CLI overrides to the loaded config and build the uploader.
pub async fn setup_uploader(args: &UploadArgs, mut config: Config) -> anyhow::Result<UploadContext> {
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    if args.no_cache {
        config.cache.enabled = false;
    }
    if args.simulate {
        config.transform.simulate = true;
    }

    tracing::debug!(
        "Storage backend: {} (bucket: {})",
        config.storage.backend,
        config.storage.bucket
    );

    let lift = Chapterlift::new(config).await?;
    let transform = apply_transform_overrides(lift.transform_config(), args);
    Ok(UploadContext { lift, transform })
}

/// CLI flags win over the `[transform]` section.
pub fn apply_transform_overrides(mut transform: TransformConfig, args: &UploadArgs) -> TransformConfig {
    if args.no_resize {
        transform.resize_enabled = false;
    }
    if let Some(max_dimension) = args.max_dimension {
        transform.max_dimension = max_dimension;
    }
    if let Some(quality) = args.quality {
        transform.quality = quality;
    }
    if args.simulate {
        transform.simulate_only = true;
    }
    transform
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> UploadArgs {
        UploadArgs {
            inputs: vec![PathBuf::from("chapter")],
            output: None,
            pretty: false,
            parallel: None,
            no_resize: false,
            max_dimension: None,
            quality: None,
            simulate: false,
            no_cache: false,
        }
    }

    #[test]
    fn overrides_keep_config_when_flags_absent() {
        let base = TransformConfig::default();
        assert_eq!(apply_transform_overrides(base, &args()), base);
    }

    #[test]
    fn overrides_apply_flags() {
        let args = UploadArgs {
            no_resize: true,
            max_dimension: Some(900),
            quality: Some(95),
            simulate: true,
            ..args()
        };
        let t = apply_transform_overrides(TransformConfig::default(), &args);
        assert!(!t.resize_enabled);
        assert_eq!(t.max_dimension, 900);
        assert_eq!(t.quality, 95);
        assert!(t.simulate_only);
    }

    #[test]
    fn collect_pages_keeps_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let chapter = dir.path().join("ch1");
        std::fs::create_dir(&chapter).unwrap();
        for name in ["10.png", "2.png", "1.png", "notes.txt"] {
            std::fs::write(chapter.join(name), b"x").unwrap();
        }
        let cover = dir.path().join("cover.jpg");
        std::fs::write(&cover, b"x").unwrap();

        let args = UploadArgs {
            inputs: vec![cover.clone(), chapter.clone()],
            ..args()
        };
        let pages = collect_pages(&args, &Config::default()).unwrap();
        let paths: Vec<_> = pages.iter().map(|p| p.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                cover,
                chapter.join("1.png"),
                chapter.join("2.png"),
                chapter.join("10.png"),
            ]
        );
    }

    #[test]
    fn collect_pages_rejects_missing_input() {
        let args = UploadArgs {
            inputs: vec![PathBuf::from("/definitely/not/here")],
            ..args()
        };
        assert!(collect_pages(&args, &Config::default()).is_err());
    }

    #[test]
    fn collected_pages_number_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["10.png", "2.png"] {
            std::fs::write(dir.path().join(name), b"xyz").unwrap();
        }
        let args = UploadArgs {
            inputs: vec![dir.path().to_path_buf()],
            ..args()
        };

        let pages = collect_pages(&args, &Config::default()).unwrap();
        assert_eq!(ChapterDiscovery::total_size(&pages), 6);

        let items = ChapterDiscovery::source_items(&pages);
        assert_eq!(items[1].index, 1);
        assert_eq!(items[1].path, dir.path().join("10.png"));
    }
}
