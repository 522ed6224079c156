//! Rendering tests — draw notes with the bundled glyphs and export to SVG.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pianotutor::renderer::{line_y, Element};
use pianotutor::{
    render_to_svg, FileImageLoader, ImageHandle, ImageLoader, MelodyEvent, NotationRenderer, NoteDuration,
    NoteGlyphCache, NoteName, ResourceLoadError, DEFAULT_MELODY,
};

fn glyph_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("images/notes")
}

fn output_dir() -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_output");
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn file_renderer() -> NotationRenderer<FileImageLoader> {
    NotationRenderer::new(Arc::new(NoteGlyphCache::new(FileImageLoader::new(glyph_dir()))))
}

/// Counts the loads passed through to the file loader.
struct CountingFileLoader {
    inner: FileImageLoader,
    loads: AtomicUsize,
}

#[async_trait]
impl ImageLoader for CountingFileLoader {
    async fn load(&self, url: &str) -> Result<ImageHandle, ResourceLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.inner.load(url).await
    }
}

#[tokio::test]
async fn bundled_glyphs_load() {
    let cache = NoteGlyphCache::new(FileImageLoader::new(glyph_dir()));
    for duration in [NoteDuration::Whole, NoteDuration::Half, NoteDuration::Quarter] {
        let glyph = cache.glyph_for(duration).await.expect("bundled glyph");
        assert!(glyph.natural_width > 0 && glyph.natural_height > 0);
    }
}

#[tokio::test]
async fn single_c_has_one_ledger_line_and_g_has_none() {
    let r = file_renderer();

    let c = r.render(&[MelodyEvent::new(NoteName::C, NoteDuration::Quarter)]).await.unwrap();
    assert_eq!(c.ledger_lines().count(), 1);
    match c.ledger_lines().next() {
        Some(Element::LedgerLine { y, .. }) => assert_eq!(*y, line_y(6.0)),
        other => panic!("expected a ledger line, got {other:?}"),
    }

    let g = r.render(&[MelodyEvent::new(NoteName::G, NoteDuration::Quarter)]).await.unwrap();
    assert_eq!(g.ledger_lines().count(), 0);
}

#[tokio::test]
async fn glyphs_keep_their_aspect_ratio() {
    let r = file_renderer();
    let whole = r.render(&[MelodyEvent::new(NoteName::E, NoteDuration::Whole)]).await.unwrap();
    let image = r.glyph_cache().glyph_for(NoteDuration::Whole).await.unwrap();

    match whole.glyphs().next() {
        Some(Element::Glyph { width, height, .. }) => {
            let expected = image.natural_height as f64 * (*width / image.natural_width as f64);
            assert!((height - expected).abs() < 1e-9);
        }
        other => panic!("expected a glyph, got {other:?}"),
    };
}

#[tokio::test]
async fn two_renders_before_load_share_it() {
    let loader = CountingFileLoader {
        inner: FileImageLoader::new(glyph_dir()),
        loads: AtomicUsize::new(0),
    };
    let r = NotationRenderer::new(Arc::new(NoteGlyphCache::new(loader)));

    let c = [MelodyEvent::new(NoteName::C, NoteDuration::Quarter)];
    let d = [MelodyEvent::new(NoteName::D, NoteDuration::Half)];
    let (a, b) = tokio::join!(r.render(&c), r.render(&d));
    a.unwrap();
    b.unwrap();
    r.render(&c).await.unwrap();

    assert_eq!(r.glyph_cache().loader().loads.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn whole_melody_svg_is_well_formed() {
    let glyphs = Arc::new(NoteGlyphCache::new(FileImageLoader::new(glyph_dir())));
    let svg = render_to_svg(glyphs, &DEFAULT_MELODY).await.expect("render melody");

    let doc = roxmltree::Document::parse(&svg).expect("valid SVG");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("height"), Some("154"));

    let images = root.children().filter(|n| n.has_tag_name("image")).count();
    let rects = root.children().filter(|n| n.has_tag_name("rect")).count();
    let below_staff = DEFAULT_MELODY
        .iter()
        .filter(|e| matches!(e.name, NoteName::C | NoteName::D))
        .count();
    assert_eq!(images, DEFAULT_MELODY.len());
    assert_eq!(rects, 5 + below_staff);

    let out = output_dir().join("default-melody.svg");
    std::fs::write(&out, &svg).expect("Failed to write SVG");
    println!("✓ Rendered default-melody.svg ({} bytes)", svg.len());
}
