use glyph_glow::config::Variant;

/// `glyph-glow [studio|night|fixed]`
///
/// The variant may also come from `GLYPH_GLOW_VARIANT`. `GLYPH_GLOW_FONT`
/// replaces the font source with a URL or a path below `./assets/`.
fn main() -> anyhow::Result<()> {
    let variant = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("GLYPH_GLOW_VARIANT").ok())
    {
        Some(name) => name.parse::<Variant>()?,
        None => Variant::default(),
    };
    let mut config = variant.config();
    if let Ok(font) = std::env::var("GLYPH_GLOW_FONT") {
        config.font_source = font;
    }
    glyph_glow::flow::run(config)
}
