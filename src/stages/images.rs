//! Image materialization
//!
//! Turns each design idea into a PNG: generate, download, resize to the
//! target resolution and, if the file is still too large, posterize once and
//! re-encode. Bytes stay in memory until the output writer persists them.

use super::{EnrichmentStage, PipelineState, StageContext};
use crate::domain::models::GeneratedImage;
use crate::error::Result;
use crate::ports::llm::ImageRequest;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

const MAX_STEM_CHARS: usize = 40;

/// Target resolution and size ceiling for written images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePolicy {
    pub width: u32,
    pub height: u32,
    pub max_bytes: usize,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        // Video thumbnail limits
        Self {
            width: 1280,
            height: 720,
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// File-name-safe slice of an image description
pub fn image_file_stem(description: &str) -> String {
    let mut stem = String::new();
    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
        if stem.len() >= MAX_STEM_CHARS {
            break;
        }
    }
    let stem = stem.trim_end_matches('-');
    if stem.is_empty() {
        "image".to_string()
    } else {
        stem.to_string()
    }
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, PngFilter::Adaptive);
    encoder.write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8)?;
    Ok(bytes)
}

/// Quantization step for an encoded size over the ceiling
///
/// Grows linearly with the overage: twice the ceiling gives 16 levels per
/// channel's worth of bucket width.
pub fn posterize_step(size: usize, max_bytes: usize) -> u8 {
    let ratio = size as f64 / max_bytes.max(1) as f64;
    (ratio * 8.0).ceil().clamp(2.0, 64.0) as u8
}

fn posterize(image: &mut RgbImage, step: u8) {
    let step = step as u16;
    for channel in image.iter_mut() {
        let bucket = *channel as u16 / step * step;
        *channel = (bucket + step / 2).min(255) as u8;
    }
}

/// Resizes downloaded image bytes and encodes them as PNG within the policy
pub fn prepare_image(bytes: &[u8], policy: &ImagePolicy) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    let mut resized = decoded
        .resize_exact(policy.width, policy.height, FilterType::Lanczos3)
        .to_rgb8();

    let encoded = encode_png(&resized)?;
    if encoded.len() <= policy.max_bytes {
        return Ok(encoded);
    }

    let step = posterize_step(encoded.len(), policy.max_bytes);
    log::info!(
        "Image is {} bytes, over the {} byte ceiling; posterizing with step {}",
        encoded.len(),
        policy.max_bytes,
        step
    );
    posterize(&mut resized, step);

    let reduced = encode_png(&resized)?;
    if reduced.len() > policy.max_bytes {
        log::warn!(
            "Image is still {} bytes after one reduction (ceiling {})",
            reduced.len(),
            policy.max_bytes
        );
    }
    Ok(reduced)
}

pub struct ImageStage;

impl ImageStage {
    async fn materialize(
        ctx: &StageContext,
        file_prefix: &str,
        index: usize,
        idea: &str,
    ) -> Result<GeneratedImage> {
        let request = ImageRequest {
            prompt: idea.to_string(),
        };
        let generation = ctx.service.generate_image(&request, &ctx.image).await?;
        let downloaded = ctx.service.fetch_image(&generation.url).await?;
        let data = prepare_image(&downloaded, &ctx.image_policy)?;

        let alt = generation
            .revised_prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| idea.to_string());
        let src = format!("{}_{}_{}.png", file_prefix, index, image_file_stem(&alt));

        log::info!("Generated image {} ({} bytes)", src, data.len());
        Ok(GeneratedImage { src, alt, data })
    }
}

#[async_trait]
impl EnrichmentStage for ImageStage {
    fn name(&self) -> &'static str {
        "images"
    }

    async fn run(&self, ctx: &StageContext, mut state: PipelineState) -> Result<PipelineState> {
        if state.meeting.images.is_some() {
            return Ok(state);
        }

        let ideas = std::mem::take(&mut state.design_ideas);
        let prefix = state.meeting.file_stem();

        let images = try_join_all(
            ideas
                .iter()
                .enumerate()
                .map(|(i, idea)| Self::materialize(ctx, &prefix, i + 1, idea)),
        )
        .await?;

        state.meeting.images = Some(images);
        Ok(state)
    }
}
