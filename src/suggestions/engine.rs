use rand::Rng;
use time::PrimitiveDateTime;
use tracing::debug;

use crate::recipes::repo::{MealCategory, Recipe};
use crate::weather::{parse_localtime, WeatherSnapshot};

use super::dto::Suggestion;
use super::slot::MealSlot;

pub const PLACEHOLDER_DISH: &str = "Buscando ideas...";
const PLACEHOLDER_REASON: &str = "Aún no tenemos clima ni recetas a mano.";
const GENERIC_REASON: &str = "¿Qué te parece esta idea?";
const NO_MATCH_REASON: &str = "Revisa el recetario para más ideas.";

const STORM_REASON: &str = "¡Tormenta afuera! Mejor un plato contundente en casa.";
const COLD_REASON: &str = "¡Mucho frío! Ideal para una sopa reponedora.";
const HEAT_REASON: &str = "¡Mucho calor! Algo fresco y liviano.";
const RAINY_ONCE_REASON: &str = "Llueve afuera... perfectos para acompañar el té.";

/// Severe-weather rules checked before any slot logic, in this order,
/// and only from noon onwards. A rule whose named recipe is missing
/// falls through to the next one.
const AFTERNOON_OVERRIDES: &[(&str, fn(&EvalContext<'_>) -> Option<Suggestion>)] = &[
    ("tormenta", storm_override),
    ("frio", cold_override),
    ("calor", heat_override),
];

struct EvalContext<'a> {
    temp_c: f64,
    condition: String,
    local: PrimitiveDateTime,
    slot: MealSlot,
    catalog: &'a [Recipe],
}

impl<'a> EvalContext<'a> {
    fn build(weather: Option<&WeatherSnapshot>, catalog: &'a [Recipe]) -> Option<Self> {
        let weather = weather?;
        if catalog.is_empty() {
            return None;
        }
        let local = parse_localtime(&weather.location.localtime)?;
        Some(Self {
            temp_c: weather.current.temp_c,
            condition: weather.current.condition.text.to_lowercase(),
            local,
            slot: MealSlot::for_time(local.time()),
            catalog,
        })
    }
}

pub fn placeholder() -> Suggestion {
    Suggestion {
        icon: "🤔".into(),
        dish: PLACEHOLDER_DISH.into(),
        reason: PLACEHOLDER_REASON.into(),
        recipe: None,
    }
}

/// Produce exactly one suggestion. Total: missing or malformed weather and
/// an empty catalog degrade to the placeholder, never to an error.
pub fn select<R: Rng>(
    weather: Option<&WeatherSnapshot>,
    catalog: &[Recipe],
    rng: &mut R,
) -> Suggestion {
    let ctx = match EvalContext::build(weather, catalog) {
        Some(ctx) => ctx,
        None => return placeholder(),
    };

    if ctx.local.hour() >= 12 {
        for (name, rule) in AFTERNOON_OVERRIDES {
            if let Some(suggestion) = rule(&ctx) {
                debug!(rule = *name, "afternoon override fired");
                return suggestion;
            }
        }
    }

    pick_for_slot(&ctx, rng)
}

fn storm_override(ctx: &EvalContext<'_>) -> Option<Suggestion> {
    if !ctx.condition.contains("tormenta") {
        return None;
    }
    let recipe = find_by_name(ctx.catalog, "pastel de papa")?;
    Some(with_recipe("⛈️", STORM_REASON, recipe))
}

fn cold_override(ctx: &EvalContext<'_>) -> Option<Suggestion> {
    if ctx.temp_c >= 10.0 {
        return None;
    }
    let recipe = ctx.catalog.iter().find(|r| {
        let name = r.name.to_lowercase();
        r.category == MealCategory::Almuerzo
            && (name.contains("cazuela") || name.contains("pantrucas"))
    })?;
    Some(with_recipe("🥶", COLD_REASON, recipe))
}

fn heat_override(ctx: &EvalContext<'_>) -> Option<Suggestion> {
    if ctx.temp_c <= 28.0 {
        return None;
    }
    let recipe = find_by_name(ctx.catalog, "pescado frito")?;
    Some(with_recipe("🥵", HEAT_REASON, recipe))
}

fn pick_for_slot<R: Rng>(ctx: &EvalContext<'_>, rng: &mut R) -> Suggestion {
    let slot = ctx.slot;
    let category = match slot.category() {
        Some(category) => category,
        None => return placeholder(),
    };

    let base: Vec<&Recipe> = ctx
        .catalog
        .iter()
        .filter(|r| r.category == category)
        .collect();

    // The weather refinement may never leave lunch without candidates; an
    // empty result is discarded and the plain category pool is kept.
    let candidates = if slot == MealSlot::Almuerzo && !base.is_empty() {
        let refined = refine_lunch(ctx, &base);
        if refined.is_empty() { base } else { refined }
    } else {
        base
    };

    // La once lluviosa va directo a los calzones rotos, tengan la
    // categoría que tengan. Comportamiento heredado de la app.
    if slot == MealSlot::Once && ctx.condition.contains("lluvia") {
        if let Some(recipe) = find_by_name(ctx.catalog, "calzones rotos") {
            debug!("rainy once override fired");
            return with_recipe("🌧️", RAINY_ONCE_REASON, recipe);
        }
    }

    if candidates.is_empty() {
        if let Some(text) = slot.default_message(ctx.local.time()) {
            return Suggestion {
                icon: slot.icon().into(),
                dish: text.into(),
                reason: NO_MATCH_REASON.into(),
                recipe: None,
            };
        }
        return placeholder();
    }

    let recipe = candidates[rng.gen_range(0..candidates.len())];
    let reason = slot
        .custom_reason()
        .or_else(|| slot.default_message(ctx.local.time()))
        .unwrap_or(GENERIC_REASON);
    Suggestion {
        icon: slot.icon().into(),
        dish: recipe.name.clone(),
        reason: reason.into(),
        recipe: Some(recipe.clone()),
    }
}

fn refine_lunch<'a>(ctx: &EvalContext<'_>, base: &[&'a Recipe]) -> Vec<&'a Recipe> {
    if ctx.temp_c < 18.0 || ctx.condition.contains("lluvia") {
        base.iter()
            .copied()
            .filter(|r| !r.name.to_lowercase().contains("pescado frito"))
            .collect()
    } else if ctx.condition.contains("soleado") || ctx.condition.contains("despejado") {
        base.iter()
            .copied()
            .filter(|r| {
                let name = r.name.to_lowercase();
                name.contains("pescado frito") || name.contains("pastel de papa")
            })
            .collect()
    } else {
        base.to_vec()
    }
}

fn find_by_name<'a>(catalog: &'a [Recipe], needle: &str) -> Option<&'a Recipe> {
    catalog
        .iter()
        .find(|r| r.name.to_lowercase().contains(needle))
}

fn with_recipe(icon: &str, reason: &str, recipe: &Recipe) -> Suggestion {
    Suggestion {
        icon: icon.into(),
        dish: recipe.name.clone(),
        reason: reason.into(),
        recipe: Some(recipe.clone()),
    }
}
