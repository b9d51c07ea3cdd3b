use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Meal windows the app organises recipes into. "Once" is the Chilean
/// late-afternoon tea, not a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_category")]
pub enum MealCategory {
    Desayuno,
    Almuerzo,
    Break,
    Once,
    Noche,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub category: MealCategory,
    pub image: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Full-catalog read; the suggestion engine works on this snapshot.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, name, category, image, ingredients, steps, created_at
        FROM recipes
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_page(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, name, category, image, ingredients, steps, created_at
        FROM recipes
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, name, category, image, ingredients, steps, created_at
        FROM recipes
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn list_by_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, name, category, image, ingredients, steps, created_at
        FROM recipes
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    name: &str,
    category: MealCategory,
    image: Option<&str>,
    ingredients: &[String],
    steps: Option<&str>,
) -> anyhow::Result<Recipe> {
    let row = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (id, name, category, image, ingredients, steps)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, category, image, ingredients, steps, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(category)
    .bind(image)
    .bind(ingredients)
    .bind(steps)
    .fetch_one(db)
    .await?;
    Ok(row)
}
