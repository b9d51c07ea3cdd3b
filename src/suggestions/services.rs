use rand::Rng;
use time::{Date, Duration};
use tracing::{debug, warn};

use crate::recipes::repo::Recipe;
use crate::storage::KvStore;
use crate::weather::{parse_localtime, WeatherSnapshot};

use super::dto::{HistoryItem, Suggestion};
use super::engine::{self, PLACEHOLDER_DISH};
use super::slot::MealSlot;

pub const HISTORY_KEY: &str = "suggestionHistory";
const HISTORY_WINDOW_DAYS: i64 = 6;

pub fn cache_key(date: Date, slot: MealSlot) -> String {
    format!("suggestion-{}-{}", iso_date(date), slot.as_str())
}

fn iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Resolve the suggestion for "today" as seen by the weather provider's
/// local clock: at most one selection per (day, slot), with the result
/// cached and appended to the rolling history.
///
/// The history update is a read-modify-write against a store without
/// transactions. Two overlapping evaluations could both read the same
/// list and the second write would drop the first append; the service is
/// invoked once per request, which keeps the window negligible.
///
/// Store failures are logged and swallowed: the caller still gets an
/// in-memory suggestion, it just is not cached that cycle.
pub async fn resolve_today<R: Rng>(
    kv: &dyn KvStore,
    weather: Option<&WeatherSnapshot>,
    catalog: &[Recipe],
    rng: &mut R,
) -> Suggestion {
    let local = weather.and_then(|w| parse_localtime(&w.location.localtime));
    let Some(local) = local else {
        // Sin hora local no hay slot ni clave de caché que valga.
        return engine::select(weather, catalog, rng);
    };
    let today = local.date();
    let slot = MealSlot::for_time(local.time());
    let key = cache_key(today, slot);

    match kv.get(&key).await {
        Ok(Some(raw)) => match serde_json::from_str::<Suggestion>(&raw) {
            Ok(cached) => {
                debug!(%key, "suggestion cache hit");
                record_history(kv, today, &cached).await;
                return cached;
            }
            Err(e) => warn!(%key, error = %e, "discarding unreadable cached suggestion"),
        },
        Ok(None) => {}
        Err(e) => warn!(%key, error = %e, "suggestion cache read failed"),
    }

    let suggestion = engine::select(weather, catalog, rng);
    if suggestion.dish == PLACEHOLDER_DISH {
        // A cycle without data is not cached; the next request retries
        // the whole sequence.
        return suggestion;
    }

    match serde_json::to_string(&suggestion) {
        Ok(raw) => {
            if let Err(e) = kv.set(&key, &raw).await {
                warn!(%key, error = %e, "suggestion cache write failed");
            }
        }
        Err(e) => warn!(error = %e, "suggestion serialization failed"),
    }
    record_history(kv, today, &suggestion).await;
    suggestion
}

/// Append to the rolling history unless `(today, dish)` is already there,
/// then prune everything older than the trailing window and write the
/// list back in one piece.
pub(crate) async fn record_history(kv: &dyn KvStore, today: Date, suggestion: &Suggestion) {
    let mut items: Vec<HistoryItem> = match kv.get(HISTORY_KEY).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "resetting unreadable history");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "history read failed");
            return;
        }
    };

    let duplicate = items
        .iter()
        .any(|it| it.date == today && it.suggestion.dish == suggestion.dish);
    if duplicate {
        return;
    }

    items.push(HistoryItem {
        date: today,
        suggestion: suggestion.clone(),
    });

    let cutoff = today - Duration::days(HISTORY_WINDOW_DAYS);
    items.retain(|it| it.date >= cutoff);

    match serde_json::to_string(&items) {
        Ok(raw) => {
            if let Err(e) = kv.set(HISTORY_KEY, &raw).await {
                warn!(error = %e, "history write failed");
            }
        }
        Err(e) => warn!(error = %e, "history serialization failed"),
    }
}

#[cfg(test)]
mod service_tests {
    use super::*;
    use crate::recipes::repo::MealCategory;
    use crate::storage::MemoryKvStore;
    use crate::weather::{CurrentWeather, WeatherCondition, WeatherLocation};
    use axum::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct FailingKvStore;

    #[async_trait]
    impl KvStore for FailingKvStore {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }
        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk on fire")
        }
        async fn remove(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    fn recipe(name: &str, category: MealCategory) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            image: None,
            ingredients: vec![],
            steps: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn weather(temp_c: f64, condition: &str, localtime: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            location: WeatherLocation {
                name: "Santiago".into(),
                localtime: localtime.into(),
            },
            current: CurrentWeather {
                temp_c,
                condition: WeatherCondition {
                    text: condition.into(),
                },
            },
        }
    }

    async fn history_of(kv: &dyn KvStore) -> Vec<HistoryItem> {
        match kv.get(HISTORY_KEY).await.unwrap() {
            Some(raw) => serde_json::from_str(&raw).unwrap(),
            None => Vec::new(),
        }
    }

    #[test]
    fn cache_key_embeds_day_and_slot() {
        assert_eq!(
            cache_key(date!(2025 - 06 - 10), MealSlot::Almuerzo),
            "suggestion-2025-06-10-Almuerzo"
        );
    }

    #[tokio::test]
    async fn same_day_and_slot_is_idempotent() {
        let kv = MemoryKvStore::default();
        let catalog = vec![
            recipe("Charquicán", MealCategory::Almuerzo),
            recipe("Porotos Granados", MealCategory::Almuerzo),
            recipe("Carbonada", MealCategory::Almuerzo),
        ];
        let w = weather(20.0, "nublado", "2025-06-10 13:00");

        let mut rng_a = StdRng::seed_from_u64(1);
        let first = resolve_today(&kv, Some(&w), &catalog, &mut rng_a).await;

        // A different seed would re-roll the pick; the cache must win.
        let mut rng_b = StdRng::seed_from_u64(999);
        let second = resolve_today(&kv, Some(&w), &catalog, &mut rng_b).await;
        assert_eq!(first, second);

        let cached = kv
            .get("suggestion-2025-06-10-Almuerzo")
            .await
            .unwrap()
            .expect("cache entry written");
        let cached: Suggestion = serde_json::from_str(&cached).unwrap();
        assert_eq!(cached, first);
    }

    #[tokio::test]
    async fn cache_hit_survives_catalog_changes() {
        let kv = MemoryKvStore::default();
        let w = weather(20.0, "nublado", "2025-06-10 13:00");

        let catalog = vec![recipe("Charquicán", MealCategory::Almuerzo)];
        let mut rng = StdRng::seed_from_u64(1);
        let first = resolve_today(&kv, Some(&w), &catalog, &mut rng).await;
        assert_eq!(first.dish, "Charquicán");

        let swapped = vec![recipe("Carbonada", MealCategory::Almuerzo)];
        let second = resolve_today(&kv, Some(&w), &swapped, &mut rng).await;
        assert_eq!(second.dish, "Charquicán");
    }

    #[tokio::test]
    async fn new_slot_gets_a_fresh_selection() {
        let kv = MemoryKvStore::default();
        let catalog = vec![
            recipe("Charquicán", MealCategory::Almuerzo),
            recipe("Pan Amasado", MealCategory::Once),
        ];
        let mut rng = StdRng::seed_from_u64(1);

        let lunch = weather(20.0, "nublado", "2025-06-10 13:00");
        let at_lunch = resolve_today(&kv, Some(&lunch), &catalog, &mut rng).await;
        assert_eq!(at_lunch.dish, "Charquicán");

        let once = weather(16.0, "nublado", "2025-06-10 17:30");
        let at_once = resolve_today(&kv, Some(&once), &catalog, &mut rng).await;
        assert_eq!(at_once.dish, "Pan Amasado");

        assert!(kv.get("suggestion-2025-06-10-Almuerzo").await.unwrap().is_some());
        assert!(kv.get("suggestion-2025-06-10-Once").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn placeholder_is_never_cached_nor_recorded() {
        let kv = MemoryKvStore::default();
        let w = weather(20.0, "nublado", "2025-06-10 13:00");
        let mut rng = StdRng::seed_from_u64(1);

        let s = resolve_today(&kv, Some(&w), &[], &mut rng).await;
        assert_eq!(s.dish, PLACEHOLDER_DISH);
        assert!(kv.get("suggestion-2025-06-10-Almuerzo").await.unwrap().is_none());
        assert!(history_of(&kv).await.is_empty());
    }

    #[tokio::test]
    async fn history_deduplicates_same_day_same_dish() {
        let kv = MemoryKvStore::default();
        let catalog = vec![recipe("Charquicán", MealCategory::Almuerzo)];
        let today = date!(2025 - 06 - 10);

        let mut rng = StdRng::seed_from_u64(1);
        let w = weather(20.0, "nublado", "2025-06-10 13:00");
        let s = resolve_today(&kv, Some(&w), &catalog, &mut rng).await;

        record_history(&kv, today, &s).await;
        record_history(&kv, today, &s).await;

        let items = history_of(&kv).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date, today);
        assert_eq!(items[0].suggestion.dish, "Charquicán");
    }

    #[tokio::test]
    async fn history_keeps_distinct_dishes_on_the_same_day() {
        let kv = MemoryKvStore::default();
        let today = date!(2025 - 06 - 10);
        let a = engine_suggestion("Charquicán");
        let b = engine_suggestion("Sopaipillas");

        record_history(&kv, today, &a).await;
        record_history(&kv, today, &b).await;

        assert_eq!(history_of(&kv).await.len(), 2);
    }

    fn engine_suggestion(dish: &str) -> Suggestion {
        Suggestion {
            icon: "🍲".into(),
            dish: dish.into(),
            reason: "¿Qué haremos de rico hoy?".into(),
            recipe: None,
        }
    }

    #[tokio::test]
    async fn history_is_pruned_to_the_trailing_week() {
        let kv = MemoryKvStore::default();
        let catalog = vec![recipe("Charquicán", MealCategory::Almuerzo)];

        // Ten consecutive days of evaluations.
        for day in 1..=10 {
            let w = weather(20.0, "nublado", &format!("2025-06-{:02} 13:00", day));
            let mut rng = StdRng::seed_from_u64(day);
            resolve_today(&kv, Some(&w), &catalog, &mut rng).await;
        }

        let items = history_of(&kv).await;
        assert_eq!(items.len(), 7);
        let oldest = items.iter().map(|it| it.date).min().unwrap();
        assert_eq!(oldest, date!(2025 - 06 - 04));
        let newest = items.iter().map(|it| it.date).max().unwrap();
        assert_eq!(newest, date!(2025 - 06 - 10));
    }

    #[tokio::test]
    async fn store_failure_still_serves_a_suggestion() {
        let catalog = vec![recipe("Charquicán", MealCategory::Almuerzo)];
        let w = weather(20.0, "nublado", "2025-06-10 13:00");
        let mut rng = StdRng::seed_from_u64(1);

        let s = resolve_today(&FailingKvStore, Some(&w), &catalog, &mut rng).await;
        assert_eq!(s.dish, "Charquicán");
    }
}
