use crate::config::Config;
use crate::models::{Pin, User};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

pub async fn create_mongodb_client(config: &Config) -> Result<Database, anyhow::Error> {
    let client = Client::with_uri_str(&config.mongodb.uri).await?;
    let db = client.database(&config.mongodb.database);
    Ok(db)
}

/// Creates the indexes the handlers rely on. Safe to run on every startup;
/// MongoDB treats re-creating an identical index as a no-op.
pub async fn ensure_indexes(db: &Database) -> Result<(), anyhow::Error> {
    let users = db.collection::<User>("users");
    for field in ["username", "email"] {
        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { field: 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await?;
    }

    let pins = db.collection::<Pin>("pins");
    pins.create_index(
        IndexModel::builder().keys(doc! { "created_at": -1 }).build(),
        None,
    )
    .await?;
    pins.create_index(IndexModel::builder().keys(doc! { "owner": 1 }).build(), None)
        .await?;

    Ok(())
}
