//! Startup seeding
//!
//! Populates baseline reference data after migrations: the default video
//! categories and, when configured, an initial admin account. Runs inside
//! its own failure boundary in `main` — a seed failure is logged and the
//! server still starts.
//!
//! Inserts are guarded (insert-if-absent, existence check) so re-running
//! is safe. The inserts are not one transaction: a mid-run failure can
//! leave a partial seed that the next successful run completes.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::SeedConfig;
use crate::db::repositories::{UserRepository, VideoCategoryRepository};
use crate::models::{User, UserRole, VideoCategory};
use crate::services::password::hash_password;

/// Default categories available on a fresh install
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("uncategorized", "Uncategorized"),
    ("gaming", "Gaming"),
    ("music", "Music"),
    ("education", "Education"),
    ("entertainment", "Entertainment"),
];

/// Run the startup seed. Returns the number of records inserted.
pub async fn run_seed(
    config: &SeedConfig,
    categories: &Arc<dyn VideoCategoryRepository>,
    users: &Arc<dyn UserRepository>,
) -> Result<usize> {
    let mut inserted = 0;

    for (slug, name) in DEFAULT_CATEGORIES {
        let existing = categories
            .get_by_slug(slug)
            .await
            .with_context(|| format!("Failed to check category '{}'", slug))?;

        if existing.is_none() {
            categories
                .create(&VideoCategory::new(slug.to_string(), name.to_string()))
                .await
                .with_context(|| format!("Failed to seed category '{}'", slug))?;
            inserted += 1;
        }
    }

    if !config.admin_username.is_empty() {
        let admins = users
            .count_admins()
            .await
            .context("Failed to count admin users")?;

        if admins == 0 {
            let email = if config.admin_email.is_empty() {
                format!("{}@localhost", config.admin_username)
            } else {
                config.admin_email.clone()
            };

            let password_hash =
                hash_password(&config.admin_password).context("Failed to hash admin password")?;

            users
                .create(&User::new(
                    config.admin_username.clone(),
                    email,
                    password_hash,
                    UserRole::Admin,
                ))
                .await
                .context("Failed to seed admin user")?;

            tracing::info!("Seeded initial admin user '{}'", config.admin_username);
            inserted += 1;
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, SqlxVideoCategoryRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::services::password::verify_password;

    async fn setup() -> (
        Arc<dyn VideoCategoryRepository>,
        Arc<dyn UserRepository>,
    ) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        (
            SqlxVideoCategoryRepository::shared(pool.clone()),
            SqlxUserRepository::shared(pool),
        )
    }

    #[tokio::test]
    async fn test_seed_inserts_default_categories() {
        let (categories, users) = setup().await;

        let inserted = run_seed(&SeedConfig::default(), &categories, &users)
            .await
            .unwrap();
        assert_eq!(inserted, DEFAULT_CATEGORIES.len());

        let all = categories.list().await.unwrap();
        assert_eq!(all.len(), DEFAULT_CATEGORIES.len());
        assert!(categories.get_by_slug("gaming").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_seed_is_rerun_safe() {
        let (categories, users) = setup().await;

        run_seed(&SeedConfig::default(), &categories, &users)
            .await
            .unwrap();
        let second = run_seed(&SeedConfig::default(), &categories, &users)
            .await
            .unwrap();

        assert_eq!(second, 0);
        assert_eq!(
            categories.list().await.unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
    }

    #[tokio::test]
    async fn test_seed_creates_admin_when_configured() {
        let (categories, users) = setup().await;

        let config = SeedConfig {
            admin_username: "root".to_string(),
            admin_email: "root@example.com".to_string(),
            admin_password: "secret-pass".to_string(),
        };

        run_seed(&config, &categories, &users).await.unwrap();

        let admin = users.get_by_username("root").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(verify_password("secret-pass", &admin.password_hash).unwrap());

        // A second run must not create another admin
        run_seed(&config, &categories, &users).await.unwrap();
        assert_eq!(users.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seed_skips_admin_when_one_exists() {
        let (categories, users) = setup().await;

        users
            .create(&User::new(
                "existing".to_string(),
                "existing@example.com".to_string(),
                "hash".to_string(),
                UserRole::Admin,
            ))
            .await
            .unwrap();

        let config = SeedConfig {
            admin_username: "root".to_string(),
            ..SeedConfig::default()
        };
        run_seed(&config, &categories, &users).await.unwrap();

        assert!(users.get_by_username("root").await.unwrap().is_none());
    }
}
