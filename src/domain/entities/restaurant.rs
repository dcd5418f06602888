//! Restaurant entity with its embedded menu.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single dish on a restaurant menu.
///
/// Prices are integer amounts in the minor unit of the checkout currency.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
}

/// A restaurant owned by exactly one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_name: String,
    pub city: String,
    pub country: String,
    pub delivery_price: i64,
    /// Minutes.
    pub estimated_delivery_time: i32,
    pub cuisines: Vec<String>,
    pub menu_items: Vec<MenuItem>,
    pub image_url: String,
    pub last_updated: DateTime<Utc>,
}

/// Menu item as submitted by the owner. Items without an id (or with an id
/// the menu does not know yet) receive a freshly generated one.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub price: i64,
}

/// Owner-editable restaurant fields, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantDraft {
    pub restaurant_name: String,
    pub city: String,
    pub country: String,
    pub delivery_price: i64,
    pub estimated_delivery_time: i32,
    pub cuisines: Vec<String>,
    pub menu_items: Vec<MenuItemDraft>,
}

impl Restaurant {
    /// Builds a new restaurant for `owner` from a validated draft.
    pub fn create(
        owner: Uuid,
        draft: RestaurantDraft,
        image_url: String,
        now: DateTime<Utc>,
    ) -> Self {
        let menu_items = draft
            .menu_items
            .into_iter()
            .map(|item| MenuItem {
                id: item.id.unwrap_or_else(Uuid::new_v4),
                name: item.name,
                price: item.price,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            user_id: owner,
            restaurant_name: draft.restaurant_name,
            city: draft.city,
            country: draft.country,
            delivery_price: draft.delivery_price,
            estimated_delivery_time: draft.estimated_delivery_time,
            cuisines: draft.cuisines,
            menu_items,
            image_url,
            last_updated: now,
        }
    }

    /// Replaces every owner-editable field. The image URL is swapped only
    /// when a new one is supplied.
    pub fn apply_draft(
        &mut self,
        draft: RestaurantDraft,
        image_url: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.restaurant_name = draft.restaurant_name;
        self.city = draft.city;
        self.country = draft.country;
        self.delivery_price = draft.delivery_price;
        self.estimated_delivery_time = draft.estimated_delivery_time;
        self.cuisines = draft.cuisines;
        self.menu_items = draft
            .menu_items
            .into_iter()
            .map(|item| MenuItem {
                id: item.id.unwrap_or_else(Uuid::new_v4),
                name: item.name,
                price: item.price,
            })
            .collect();
        if let Some(url) = image_url {
            self.image_url = url;
        }
        self.last_updated = now;
    }

    /// Looks up a menu item by id in the current menu.
    pub fn menu_item(&self, id: Uuid) -> Option<&MenuItem> {
        self.menu_items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RestaurantDraft {
        RestaurantDraft {
            restaurant_name: "La Pasta".to_string(),
            city: "Valparaiso".to_string(),
            country: "Chile".to_string(),
            delivery_price: 1500,
            estimated_delivery_time: 30,
            cuisines: vec!["Italian".to_string()],
            menu_items: vec![MenuItemDraft {
                id: None,
                name: "Lasagna".to_string(),
                price: 8900,
            }],
        }
    }

    #[test]
    fn test_create_generates_menu_ids() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let restaurant = Restaurant::create(owner, draft(), "https://img/1.png".to_string(), now);

        assert_eq!(restaurant.user_id, owner);
        assert_eq!(restaurant.menu_items.len(), 1);
        assert!(!restaurant.menu_items[0].id.is_nil());
        assert_eq!(restaurant.last_updated, now);
    }

    #[test]
    fn test_apply_draft_keeps_image_without_upload() {
        let mut restaurant =
            Restaurant::create(Uuid::new_v4(), draft(), "https://img/1.png".to_string(), Utc::now());

        let mut changed = draft();
        changed.restaurant_name = "La Pasta Nueva".to_string();
        restaurant.apply_draft(changed, None, Utc::now());

        assert_eq!(restaurant.restaurant_name, "La Pasta Nueva");
        assert_eq!(restaurant.image_url, "https://img/1.png");
    }

    #[test]
    fn test_apply_draft_preserves_supplied_menu_ids() {
        let mut restaurant =
            Restaurant::create(Uuid::new_v4(), draft(), "https://img/1.png".to_string(), Utc::now());
        let kept_id = restaurant.menu_items[0].id;

        let mut changed = draft();
        changed.menu_items = vec![
            MenuItemDraft {
                id: Some(kept_id),
                name: "Lasagna".to_string(),
                price: 9500,
            },
            MenuItemDraft {
                id: None,
                name: "Tiramisu".to_string(),
                price: 4000,
            },
        ];
        restaurant.apply_draft(changed, Some("https://img/2.png".to_string()), Utc::now());

        assert_eq!(restaurant.menu_item(kept_id).map(|m| m.price), Some(9500));
        assert_eq!(restaurant.menu_items.len(), 2);
        assert_eq!(restaurant.image_url, "https://img/2.png");
    }
}
