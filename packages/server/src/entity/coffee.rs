use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coffee")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub coffee_name: String,
    pub coffee_type: String,
    pub rate: f64,
    pub comment_count: i32,

    /// Storage path of the uploaded image (`<upload_dir>/<key>`). Rendered
    /// to the public URL form at the response boundary, never returned raw.
    pub image: String,

    pub price: f64,
    pub is_liked: bool,
    pub desc: String,
    pub buy_count: i32,
    pub coffee_shop_location: String,
    pub coffee_address: String,
}

impl ActiveModelBehavior for ActiveModel {}
