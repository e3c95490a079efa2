//! Raw intent validation.
//!
//! Turns an untyped JSON value into a [`BuildIntent`]. Checks run in a fixed
//! order so the reported error is always the same for the same input:
//! `mode`, then required fields, then optional fields in declaration order,
//! then any leftover key.

use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::intent::{
    ApplicationIntent, BuildIntent, BuilderTuning, ImageQuality, LibraryIntent, Mode,
    ObjectReader, PwaOptions, ServerIntent,
};

pub const MIN_PORT: u64 = 1024;
pub const MAX_PORT: u64 = 65535;
pub(crate) const PORT_BOUNDS: &str = "1024..=65535";

pub(crate) const QUALITY_BOUNDS: &str = "1..=100";
pub(crate) const THRESHOLD_BOUNDS: &str = "greater than 0";

/// Validate a raw build intent.
///
/// # Example
///
/// ```
/// use kiln_config::{validate, BuildIntent, Mode};
/// use serde_json::json;
///
/// let intent = validate(&json!({
///     "mode": "library",
///     "name": "Utils",
///     "entry": "src/index.ts"
/// }))
/// .unwrap();
///
/// assert_eq!(intent.mode(), Mode::Library);
/// assert!(matches!(intent, BuildIntent::Library(lib) if lib.emit_declarations));
/// ```
pub fn validate(raw: &Value) -> Result<BuildIntent> {
    let mut reader = ObjectReader::root(raw)?;
    let mode = read_mode(&mut reader)?;

    let intent = match mode {
        Mode::Application => BuildIntent::Application(application(&mut reader)?),
        Mode::Library => BuildIntent::Library(library(&mut reader)?),
        Mode::Server => BuildIntent::Server(server(&mut reader)?),
    };

    reader.finish()?;
    tracing::trace!(mode = %mode, name = intent.name(), "intent validated");
    Ok(intent)
}

fn read_mode(reader: &mut ObjectReader<'_>) -> Result<Mode> {
    let found = match reader.peek("mode") {
        None | Some(Value::Null) => return Err(ValidationError::UnknownMode { found: None }),
        Some(Value::String(literal)) => literal.clone(),
        Some(other) => other.to_string(),
    };

    let mode = Mode::from_literal(&found).ok_or(ValidationError::UnknownMode {
        found: Some(found),
    })?;
    reader.mark_consumed("mode");
    Ok(mode)
}

fn application(reader: &mut ObjectReader<'_>) -> Result<ApplicationIntent> {
    let name = reader.required_string("name")?;

    let port = port(reader)?;
    let entry_override = reader.string("entryOverride")?;
    let asset_extensions = reader.string_list("assetExtensions")?.unwrap_or_default();
    let compression_threshold_bytes =
        reader.integer_in("compressionThresholdBytes", 1, u64::MAX, THRESHOLD_BOUNDS)?;
    let csp_policy = reader.string_list_map("cspPolicy")?.unwrap_or_default();
    let image_quality = reader
        .nested("imageQuality")?
        .map(image_quality)
        .transpose()?;
    let pwa = reader.nested("pwa")?.map(pwa).transpose()?;
    let webfont_urls = reader.string_list("webfontUrls")?.unwrap_or_default();
    let root_override = reader.string("rootOverride")?;
    let builder_tuning = reader
        .nested("builderTuning")?
        .map(builder_tuning)
        .transpose()?;

    Ok(ApplicationIntent {
        name,
        port,
        entry_override,
        asset_extensions,
        compression_threshold_bytes,
        csp_policy,
        image_quality,
        pwa,
        webfont_urls,
        root_override,
        builder_tuning,
    })
}

fn library(reader: &mut ObjectReader<'_>) -> Result<LibraryIntent> {
    let name = reader.required_string("name")?;
    let entry = reader.entry("entry")?;

    Ok(LibraryIntent {
        name,
        entry,
        external: reader.string_list("external")?.unwrap_or_default(),
        emit_declarations: reader.bool("emitDeclarations")?.unwrap_or(true),
        enable_react: reader.bool("enableReact")?.unwrap_or(false),
        css_entry: reader.string("cssEntry")?,
    })
}

fn server(reader: &mut ObjectReader<'_>) -> Result<ServerIntent> {
    let name = reader.required_string("name")?;
    let entry = reader.entry("entry")?;

    Ok(ServerIntent {
        name,
        entry,
        external: reader.string_list("external")?.unwrap_or_default(),
        port: port(reader)?,
    })
}

fn port(reader: &mut ObjectReader<'_>) -> Result<Option<u16>> {
    let port = reader.integer_in("port", MIN_PORT, MAX_PORT, PORT_BOUNDS)?;
    Ok(port.and_then(|p| u16::try_from(p).ok()))
}

fn image_quality(mut reader: ObjectReader<'_>) -> Result<ImageQuality> {
    let mut quality = |key| {
        reader
            .integer_in(key, 1, 100, QUALITY_BOUNDS)
            .map(|q| q.and_then(|q| u8::try_from(q).ok()))
    };
    let parsed = ImageQuality {
        avif: quality("avif")?,
        jpeg: quality("jpeg")?,
        png: quality("png")?,
        webp: quality("webp")?,
    };
    reader.finish()?;
    Ok(parsed)
}

fn pwa(mut reader: ObjectReader<'_>) -> Result<PwaOptions> {
    let parsed = PwaOptions {
        name: reader.required_string("name")?,
        short_name: reader.string("shortName")?,
        description: reader.text("description")?,
        theme_color: reader.string("themeColor")?,
    };
    reader.finish()?;
    Ok(parsed)
}

fn builder_tuning(mut reader: ObjectReader<'_>) -> Result<BuilderTuning> {
    let parsed = BuilderTuning {
        shared_config_build: reader.bool("sharedConfigBuild")?,
        shared_plugins: reader.bool("sharedPlugins")?,
    };
    reader.finish()?;
    Ok(parsed)
}
