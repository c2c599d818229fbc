//! Integration tests for composing onto base artwork read from disk.
//!
//! Run with: cargo test --package labelstation-label --test base_assets

use image::{GrayImage, Luma};
use labelstation_core::DeviceType;
use labelstation_label::mock::FixedSymbolRenderer;
use labelstation_label::tspl::{self, PrintSettings};
use labelstation_label::{BaseAssets, LabelComposer, LabelError, TemplateRegistry};
use tempfile::TempDir;

/// Artwork with a black frame, at half the artifact resolution.
fn write_artwork(dir: &TempDir, name: &str) {
    let art = GrayImage::from_fn(602, 295, |x, y| {
        if x < 4 || y < 4 || x >= 598 || y >= 291 {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    art.save(dir.path().join(name)).unwrap();
}

fn composer(dir: &TempDir) -> LabelComposer {
    LabelComposer::new(
        TemplateRegistry::builtin(),
        BaseAssets::directory(dir.path()),
        FixedSymbolRenderer::new(),
    )
}

#[test]
fn test_overlay_is_merged_onto_artwork() {
    let dir = TempDir::new().unwrap();
    write_artwork(&dir, "templ_103g.png");

    let page = composer(&dir)
        .compose("RC-103G-000123", DeviceType::Rc103G, b"RC-103G-000123")
        .unwrap();

    assert_eq!(page.base.dimensions(), (1205, 591));
    assert!(page.base.get_pixel(0, 0)[0] < 128);
    assert!(page.base.get_pixel(600, 300)[0] > 128);

    let flat = page.flatten();
    let symbol = page.symbol.as_ref().unwrap();
    assert_eq!(flat.get_pixel(symbol.x_dots, symbol.y_dots)[0], 0);
    assert!(flat.get_pixel(0, 0)[0] < 128);
}

#[test]
fn test_each_type_reads_its_own_artwork() {
    let dir = TempDir::new().unwrap();
    write_artwork(&dir, "templ_103.png");

    let composer = composer(&dir);
    composer
        .compose("RC-103-000123", DeviceType::Rc103, b"RC-103-000123")
        .unwrap();

    let err = composer
        .compose("RC-103G-000123", DeviceType::Rc103G, b"RC-103G-000123")
        .unwrap_err();
    assert!(matches!(err, LabelError::AssetMissing { ref path } if path.ends_with("templ_103g.png")));
}

#[test]
fn test_corrupt_artwork_is_unreadable() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("templ_110.png"), b"not a png").unwrap();

    let err = composer(&dir)
        .compose("RC-110-000001", DeviceType::Rc110, b"RC-110-000001")
        .unwrap_err();
    assert!(matches!(err, LabelError::AssetUnreadable { .. }));
    assert!(!err.is_internal());
}

#[test]
fn test_printed_job_carries_artwork_and_symbol() {
    let dir = TempDir::new().unwrap();
    write_artwork(&dir, "templ_102.png");

    let page = composer(&dir)
        .compose("RC-102-000001", DeviceType::Rc102, b"RC-102-000001")
        .unwrap();
    let job = tspl::encode(&page, &PrintSettings::default());
    let text = String::from_utf8_lossy(&job);

    assert_eq!(text.matches("BITMAP ").count(), 2);
    assert!(text.contains("BITMAP 0,0,76,296,0,"));
    // Eight regular fields and the serial struck twice.
    assert_eq!(text.matches("TEXT ").count(), 10);
    assert!(text.contains("\"Type RADIACODE-102\""));
    assert!(text.ends_with("PRINT 1\r\n"));
}
