use std::str::FromStr;

use common::storage::ImageStore;
use serde::{Deserialize, Serialize};

use crate::entity::coffee;
use crate::error::AppError;

/// Wire representation of a coffee record.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeResponse {
    pub id: i32,
    #[schema(example = "Latte")]
    pub coffee_name: String,
    #[schema(example = "Espresso-based")]
    pub coffee_type: String,
    #[schema(example = 4.5)]
    pub rate: f64,
    pub comment_count: i32,
    /// Public URL of the uploaded image.
    #[schema(example = "/uploads/0193a2f0-8a76-4b8d-9cb6-0e3a1c2d4e5f.png")]
    pub image: String,
    #[schema(example = 4.5)]
    pub price: f64,
    pub is_liked: bool,
    pub desc: String,
    pub buy_count: i32,
    pub coffee_shop_location: String,
    pub coffee_address: String,
}

impl CoffeeResponse {
    /// Single rendering step at the response boundary: the stored raw path
    /// goes in, the public URL form comes out.
    pub fn from_model(m: coffee::Model, images: &dyn ImageStore) -> Self {
        Self {
            id: m.id,
            coffee_name: m.coffee_name,
            coffee_type: m.coffee_type,
            rate: m.rate,
            comment_count: m.comment_count,
            image: images.public_url(&m.image),
            price: m.price,
            is_liked: m.is_liked,
            desc: m.desc,
            buy_count: m.buy_count,
            coffee_shop_location: m.coffee_shop_location,
            coffee_address: m.coffee_address,
        }
    }
}

/// Scalar fields of the create form. All required.
#[derive(Debug)]
pub struct CreateCoffee {
    pub coffee_name: String,
    pub coffee_type: String,
    pub rate: f64,
    pub comment_count: i32,
    pub price: f64,
    pub is_liked: bool,
    pub desc: String,
    pub buy_count: i32,
    pub coffee_shop_location: String,
    pub coffee_address: String,
}

/// Partial update. An absent field means "leave unchanged".
#[derive(Debug, Default, PartialEq, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct UpdateCoffee {
    pub coffee_name: Option<String>,
    pub coffee_type: Option<String>,
    pub rate: Option<f64>,
    pub comment_count: Option<i32>,
    pub price: Option<f64>,
    pub is_liked: Option<bool>,
    pub desc: Option<String>,
    pub buy_count: Option<i32>,
    pub coffee_shop_location: Option<String>,
    pub coffee_address: Option<String>,
}

impl UpdateCoffee {
    /// Overlay fields provided in `other` on top of `self`.
    pub fn merge(mut self, other: UpdateCoffee) -> UpdateCoffee {
        if other.coffee_name.is_some() {
            self.coffee_name = other.coffee_name;
        }
        if other.coffee_type.is_some() {
            self.coffee_type = other.coffee_type;
        }
        if other.rate.is_some() {
            self.rate = other.rate;
        }
        if other.comment_count.is_some() {
            self.comment_count = other.comment_count;
        }
        if other.price.is_some() {
            self.price = other.price;
        }
        if other.is_liked.is_some() {
            self.is_liked = other.is_liked;
        }
        if other.desc.is_some() {
            self.desc = other.desc;
        }
        if other.buy_count.is_some() {
            self.buy_count = other.buy_count;
        }
        if other.coffee_shop_location.is_some() {
            self.coffee_shop_location = other.coffee_shop_location;
        }
        if other.coffee_address.is_some() {
            self.coffee_address = other.coffee_address;
        }
        self
    }
}

/// Confirmation payload for a successful delete.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteCoffeeResponse {
    /// Fixed confirmation message.
    #[schema(example = "Coffee deleted successfully")]
    pub detail: String,
}

impl Default for DeleteCoffeeResponse {
    fn default() -> Self {
        Self {
            detail: "Coffee deleted successfully".into(),
        }
    }
}

/// Text fields collected from a multipart form, keyed by their wire names.
#[derive(Debug, Default)]
pub struct CoffeeFormFields {
    pub coffee_name: Option<String>,
    pub coffee_type: Option<String>,
    pub rate: Option<String>,
    pub comment_count: Option<String>,
    pub price: Option<String>,
    pub is_liked: Option<String>,
    pub desc: Option<String>,
    pub buy_count: Option<String>,
    pub coffee_shop_location: Option<String>,
    pub coffee_address: Option<String>,
}

impl CoffeeFormFields {
    /// Record a text field by its form name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "coffeeName" => self.coffee_name = Some(value),
            "coffeeType" => self.coffee_type = Some(value),
            "rate" => self.rate = Some(value),
            "commentCount" => self.comment_count = Some(value),
            "price" => self.price = Some(value),
            "isLiked" => self.is_liked = Some(value),
            "desc" => self.desc = Some(value),
            "buyCount" => self.buy_count = Some(value),
            "coffeeShopLocation" => self.coffee_shop_location = Some(value),
            "coffeeAddress" => self.coffee_address = Some(value),
            _ => {}
        }
    }

    /// Create contract: every field present and well-formed.
    pub fn try_into_create(self) -> Result<CreateCoffee, AppError> {
        Ok(CreateCoffee {
            coffee_name: require(self.coffee_name, "coffeeName")?,
            coffee_type: require(self.coffee_type, "coffeeType")?,
            rate: parse_field(&require(self.rate, "rate")?, "rate")?,
            comment_count: parse_field(&require(self.comment_count, "commentCount")?, "commentCount")?,
            price: parse_field(&require(self.price, "price")?, "price")?,
            is_liked: parse_bool(&require(self.is_liked, "isLiked")?, "isLiked")?,
            desc: require(self.desc, "desc")?,
            buy_count: parse_field(&require(self.buy_count, "buyCount")?, "buyCount")?,
            coffee_shop_location: require(self.coffee_shop_location, "coffeeShopLocation")?,
            coffee_address: require(self.coffee_address, "coffeeAddress")?,
        })
    }

    /// Update contract: whatever is present must be well-formed.
    pub fn try_into_update(self) -> Result<UpdateCoffee, AppError> {
        Ok(UpdateCoffee {
            coffee_name: self.coffee_name,
            coffee_type: self.coffee_type,
            rate: parse_optional(self.rate, "rate")?,
            comment_count: parse_optional(self.comment_count, "commentCount")?,
            price: parse_optional(self.price, "price")?,
            is_liked: parse_optional_bool(self.is_liked, "isLiked")?,
            desc: self.desc,
            buy_count: parse_optional(self.buy_count, "buyCount")?,
            coffee_shop_location: self.coffee_shop_location,
            coffee_address: self.coffee_address,
        })
    }
}

fn require(value: Option<String>, name: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("Missing form field: {name}")))
}

fn parse_field<T: FromStr>(raw: &str, name: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Malformed value for field: {name}")))
}

fn parse_optional<T: FromStr>(value: Option<String>, name: &str) -> Result<Option<T>, AppError> {
    value.map(|raw| parse_field(&raw, name)).transpose()
}

/// Form-style boolean: accepts true/false, 1/0, yes/no, on/off.
fn parse_bool(raw: &str, name: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "Malformed value for field: {name}"
        ))),
    }
}

fn parse_optional_bool(value: Option<String>, name: &str) -> Result<Option<bool>, AppError> {
    value.map(|raw| parse_bool(&raw, name)).transpose()
}
