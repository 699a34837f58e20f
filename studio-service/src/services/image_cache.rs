//! Bounded, single-flight cache of generated section images.
//!
//! Entries are keyed by the caller's section id. A miss triggers exactly one
//! provider call per key even under concurrent requests; waiters share the
//! result. Failed generations are not cached.

use crate::config::ImageCacheConfig;
use crate::models::CachedImage;
use crate::services::providers::{ImageProvider, ImageRequest, ProviderError};
use metrics::counter;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use service_core::error::AppError;
use std::sync::Arc;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert cinematic image generator. \
Create stunning, high-quality, professional images suitable for website backgrounds.";

/// Wrap the caller's theme in the fixed style directives.
pub fn enhance_prompt(theme: &str) -> String {
    format!(
        "Create a stunning, cinematic, high-resolution image for a professional business website background.

Theme: {theme}

Style requirements:
- Ultra high quality, 4K resolution feel
- Cinematic lighting with dramatic shadows
- Dark, moody atmosphere suitable for white text overlay
- Professional and modern aesthetic
- Subtle depth of field effect
- Rich colors but not oversaturated
- Suitable for a web agency/design studio website

The image should evoke professionalism, creativity, and innovation."
    )
}

#[derive(Clone)]
pub struct ImageCache {
    cache: Cache<String, CachedImage>,
    provider: Arc<dyn ImageProvider>,
}

impl ImageCache {
    pub fn new(provider: Arc<dyn ImageProvider>, config: &ImageCacheConfig) -> Self {
        // LRU admits every new entry; a generated image must survive a full cache.
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru());
        if let Some(tti) = config.time_to_idle {
            builder = builder.time_to_idle(tti);
        }

        Self {
            cache: builder.build(),
            provider,
        }
    }

    /// Return the image cached under `section_id`, generating it from
    /// `prompt` on a miss.
    pub async fn get_or_generate(
        &self,
        section_id: &str,
        prompt: &str,
    ) -> Result<CachedImage, AppError> {
        if let Some(image) = self.cache.get(section_id).await {
            counter!("image_cache_requests_total", "result" => "hit").increment(1);
            if image.prompt != prompt {
                tracing::warn!(
                    section_id = %section_id,
                    "Section id reused with a different prompt; serving cached image"
                );
            }
            tracing::info!(section_id = %section_id, "Returning cached image");
            return Ok(image);
        }

        counter!("image_cache_requests_total", "result" => "miss").increment(1);

        let provider = Arc::clone(&self.provider);
        let section = section_id.to_string();
        let theme = prompt.to_string();

        let init = async move {
            let request = ImageRequest {
                system_instruction: SYSTEM_INSTRUCTION.to_string(),
                prompt: enhance_prompt(&theme),
            };

            tracing::info!(section_id = %section, "Generating image");
            match provider.generate_image(&request).await {
                Ok(generated) => {
                    counter!("image_provider_calls_total", "status" => "success").increment(1);
                    if let Some(text) = &generated.text {
                        tracing::debug!(
                            section_id = %section,
                            model_text = %text,
                            "Model returned text with image"
                        );
                    }
                    tracing::info!(section_id = %section, "Successfully generated image");
                    Ok(CachedImage {
                        section_id: section,
                        image_data: generated.data,
                        mime_type: generated.mime_type,
                        prompt: theme,
                    })
                }
                Err(e) => {
                    counter!("image_provider_calls_total", "status" => "error").increment(1);
                    tracing::error!(section_id = %section, error = %e, "Image generation failed");
                    Err(e)
                }
            }
        };

        self.cache
            .try_get_with(section_id.to_string(), init)
            .await
            .map_err(|e: Arc<ProviderError>| AppError::from(e.as_ref().clone()))
    }

    /// Cached image for `section_id`, without generating.
    pub async fn get(&self, section_id: &str) -> Option<CachedImage> {
        self.cache.get(section_id).await
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{MockBehavior, MockImageProvider};
    use std::time::Duration;

    fn config(max_capacity: u64) -> ImageCacheConfig {
        ImageCacheConfig {
            max_capacity,
            time_to_idle: None,
        }
    }

    #[test]
    fn enhanced_prompt_embeds_theme() {
        let prompt = enhance_prompt("neon city at dusk");
        assert!(prompt.contains("Theme: neon city at dusk"));
        assert!(prompt.contains("Cinematic lighting"));
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let provider = Arc::new(MockImageProvider::new());
        let cache = ImageCache::new(provider.clone(), &config(16));

        let first = cache.get_or_generate("hero", "a studio").await.unwrap();
        let second = cache.get_or_generate("hero", "a studio").await.unwrap();

        assert_eq!(first.image_data, second.image_data);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_misses_generate_once() {
        let provider =
            Arc::new(MockImageProvider::new().with_delay(Duration::from_millis(50)));
        let cache = ImageCache::new(provider.clone(), &config(16));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_or_generate("hero", "a studio").await })
            })
            .collect();

        let mut images = Vec::new();
        for handle in handles {
            images.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(provider.call_count(), 1);
        assert!(images.windows(2).all(|w| w[0].image_data == w[1].image_data));
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let provider = Arc::new(MockImageProvider::with_behavior(MockBehavior::Fail(
            ProviderError::NoImage,
        )));
        let cache = ImageCache::new(provider.clone(), &config(16));

        let result = cache.get_or_generate("hero", "a studio").await;
        assert!(matches!(result, Err(AppError::UpstreamError(_))));
        assert!(cache.get("hero").await.is_none());

        let _ = cache.get_or_generate("hero", "a studio").await;
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn reused_section_id_keeps_first_image() {
        let provider = Arc::new(MockImageProvider::new());
        let cache = ImageCache::new(provider.clone(), &config(16));

        let first = cache.get_or_generate("slot", "mountains").await.unwrap();
        let second = cache.get_or_generate("slot", "ocean").await.unwrap();

        assert_eq!(first.image_data, second.image_data);
        assert_eq!(second.prompt, "mountains");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn capacity_bounds_resident_entries() {
        let provider = Arc::new(MockImageProvider::new());
        let cache = ImageCache::new(provider, &config(2));

        for i in 0..10 {
            cache
                .get_or_generate(&format!("section-{}", i), "a studio")
                .await
                .unwrap();
        }
        cache.cache.run_pending_tasks().await;

        assert!(cache.entry_count() <= 2);
    }

    #[tokio::test]
    async fn new_image_is_kept_when_cache_is_full_of_hot_entries() {
        let provider = Arc::new(MockImageProvider::new());
        let cache = ImageCache::new(provider.clone(), &config(32));

        for i in 0..32 {
            cache
                .get_or_generate(&format!("section-{}", i), "a studio")
                .await
                .unwrap();
        }
        for _ in 0..10 {
            for i in 0..32 {
                assert!(cache.get(&format!("section-{}", i)).await.is_some());
            }
        }
        cache.cache.run_pending_tasks().await;

        let fresh = cache.get_or_generate("new", "a studio").await.unwrap();
        cache.cache.run_pending_tasks().await;

        let kept = cache.get("new").await.expect("new image evicted on insert");
        assert_eq!(kept.image_data, fresh.image_data);

        let again = cache.get_or_generate("new", "a studio").await.unwrap();
        assert_eq!(again.image_data, fresh.image_data);
        assert_eq!(provider.call_count(), 33);
        assert!(cache.entry_count() <= 32);
    }
}
