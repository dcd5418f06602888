#![allow(dead_code)]

//! In-memory stand-ins for the store and external services, and a test
//! server wired with the production routers.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use food_ordering::application::services::CheckoutSettings;
use food_ordering::domain::entities::{
    CartItem, DeliveryDetails, MenuItem, MenuItemDraft, NewUser, Order, OrderStatus, Restaurant,
    RestaurantDraft, Subject, User, UserProfile,
};
use food_ordering::domain::repositories::{
    OrderRepository, RestaurantRepository, RestaurantSearch, SortOption, UserRepository,
};
use food_ordering::error::AppError;
use food_ordering::infrastructure::assets::{AssetError, AssetUploader, ImageUpload};
use food_ordering::infrastructure::identity::{IdentityError, TokenVerifier};
use food_ordering::infrastructure::payments::{
    CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentEvent, PaymentGateway,
    parse_event, sign_payload, verify_signature,
};
use food_ordering::infrastructure::persistence::{PgRestaurantRepository, PgUserRepository};
use food_ordering::routes::unthrottled_router;
use food_ordering::state::{AppState, Gateways, Repositories};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const FRONTEND_URL: &str = "http://localhost:5173";

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUsers {
    pub rows: Mutex<Vec<User>>,
    pub unavailable: AtomicBool,
}

impl InMemoryUsers {
    pub fn find_subject(&self, subject: &str) -> User {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.auth0_id == subject)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn ping(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", serde_json::json!({})));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.auth0_id == auth0_id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create(&self, new_user: NewUser) -> Result<Option<User>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.auth0_id == new_user.auth0_id) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            auth0_id: new_user.auth0_id,
            email: new_user.email,
            name: new_user.name,
            address_line1: new_user.address_line1,
            city: new_user.city,
            country: new_user.country,
        };
        rows.push(user.clone());
        Ok(Some(user))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        profile: UserProfile,
    ) -> Result<Option<User>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|u| u.id == id).map(|user| {
            user.apply_profile(profile);
            user.clone()
        }))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryRestaurants {
    pub rows: Mutex<Vec<Restaurant>>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl InMemoryRestaurants {
    fn matching(&self, search: &RestaurantSearch) -> Vec<Restaurant> {
        let mut found: Vec<Restaurant> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| contains_ci(&r.city, &search.city))
            .filter(|r| {
                search
                    .cuisines
                    .iter()
                    .all(|tag| r.cuisines.iter().any(|c| contains_ci(c, tag)))
            })
            .filter(|r| match &search.search_query {
                Some(q) => {
                    contains_ci(&r.restaurant_name, q) || r.cuisines.iter().any(|c| contains_ci(c, q))
                }
                None => true,
            })
            .cloned()
            .collect();

        match search.sort {
            SortOption::BestMatch => {}
            SortOption::LastUpdated => found.sort_by_key(|r| r.last_updated),
            SortOption::DeliveryPrice => found.sort_by_key(|r| r.delivery_price),
            SortOption::EstimatedDeliveryTime => found.sort_by_key(|r| r.estimated_delivery_time),
            SortOption::RestaurantName => {
                found.sort_by(|a, b| a.restaurant_name.cmp(&b.restaurant_name))
            }
        }
        found
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryRestaurants {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Restaurant>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Restaurant>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, restaurant: &Restaurant) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.user_id == restaurant.user_id) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({"constraint": "restaurants_user_id_key"}),
            ));
        }
        rows.push(restaurant.clone());
        Ok(())
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == restaurant.id) {
            Some(row) => {
                *row = restaurant.clone();
                Ok(())
            }
            None => Err(AppError::not_found(
                "Restaurant not found",
                serde_json::json!({}),
            )),
        }
    }

    async fn count_by_city(&self, city: &str) -> Result<i64, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| contains_ci(&r.city, city))
            .count() as i64)
    }

    async fn search(&self, search: &RestaurantSearch) -> Result<Vec<Restaurant>, AppError> {
        Ok(self
            .matching(search)
            .into_iter()
            .skip(search.offset as usize)
            .take(search.limit as usize)
            .collect())
    }

    async fn count_matching(&self, search: &RestaurantSearch) -> Result<i64, AppError> {
        Ok(self.matching(search).len() as i64)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    pub rows: Mutex<Vec<Order>>,
}

impl InMemoryOrders {
    pub fn get(&self, id: Uuid) -> Option<Order> {
        self.rows.lock().unwrap().iter().find(|o| o.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        Ok(self.get(id))
    }

    async fn insert(&self, order: &Order) -> Result<(), AppError> {
        self.rows.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Order>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.restaurant_id == restaurant_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.clone()
        }))
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        total_amount: Option<i64>,
    ) -> Result<Option<Order>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|o| o.id == id).map(|order| {
            if order.status == OrderStatus::Placed {
                order.total_amount = total_amount;
                order.status = OrderStatus::Paid;
            }
            order.clone()
        }))
    }

    async fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(OrderStatus::ALL
            .into_iter()
            .map(|s| (s, rows.iter().filter(|o| o.status == s).count() as i64))
            .filter(|(_, n)| *n > 0)
            .collect())
    }
}

// ─── External services ───────────────────────────────────────────────────────

/// Accepts tokens of the form `valid:<subject>`.
pub struct StubVerifier;

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<Subject, IdentityError> {
        token
            .strip_prefix("valid:")
            .map(|subject| Subject(subject.to_string()))
            .ok_or(IdentityError::MissingKeyId)
    }
}

#[derive(Default)]
pub struct StubAssets {
    pub uploads: Mutex<Vec<ImageUpload>>,
    pub failing: AtomicBool,
}

#[async_trait]
impl AssetUploader for StubAssets {
    async fn upload_image(&self, image: ImageUpload) -> Result<String, AssetError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AssetError::MissingUrl);
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(image);
        Ok(format!(
            "https://res.cloudinary.com/demo/image/upload/{}.png",
            uploads.len()
        ))
    }
}

/// Records session requests; verifies webhooks with the real signature scheme.
#[derive(Default)]
pub struct StubPayments {
    pub sessions: Mutex<Vec<CheckoutSessionRequest>>,
    pub failing: AtomicBool,
    pub without_url: AtomicBool,
}

#[async_trait]
impl PaymentGateway for StubPayments {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PaymentError::Api {
                status: 402,
                message: "card_declined".to_string(),
            });
        }
        let id = format!("cs_test_{}", request.order_id.simple());
        self.sessions.lock().unwrap().push(request);

        let url = (!self.without_url.load(Ordering::SeqCst))
            .then(|| format!("https://checkout.stripe.com/c/pay/{id}"));
        Ok(CheckoutSession { id, url })
    }

    fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PaymentEvent, PaymentError> {
        verify_signature(payload, signature_header, WEBHOOK_SECRET, Utc::now().timestamp())?;
        parse_event(payload)
    }
}

// ─── Server ──────────────────────────────────────────────────────────────────

pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<InMemoryUsers>,
    pub restaurants: Arc<InMemoryRestaurants>,
    pub orders: Arc<InMemoryOrders>,
    pub assets: Arc<StubAssets>,
    pub payments: Arc<StubPayments>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let restaurants = Arc::new(InMemoryRestaurants::default());
        let orders = Arc::new(InMemoryOrders::default());
        let assets = Arc::new(StubAssets::default());
        let payments = Arc::new(StubPayments::default());

        let state = AppState::new(
            Repositories {
                users: users.clone(),
                restaurants: restaurants.clone(),
                orders: orders.clone(),
            },
            Gateways {
                identity: Arc::new(StubVerifier),
                assets: assets.clone(),
                payments: payments.clone(),
            },
            CheckoutSettings::new(&format!("{FRONTEND_URL}/"), "clp"),
        );

        let server = TestServer::new(unthrottled_router(state)).unwrap();

        Self {
            server,
            users,
            restaurants,
            orders,
            assets,
            payments,
        }
    }

    pub fn seed_user(&self, subject: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            auth0_id: subject.to_string(),
            email: format!("{}@example.com", subject.replace('|', ".")),
            name: None,
            address_line1: None,
            city: None,
            country: None,
        };
        self.users.rows.lock().unwrap().push(user.clone());
        user
    }

    /// Seeds a restaurant with the given menu `(name, price)`. Each call
    /// is one minute "newer" than the last restaurant seeded.
    pub fn seed_restaurant(
        &self,
        owner: Uuid,
        name: &str,
        city: &str,
        cuisines: &[&str],
        delivery_price: i64,
        menu: &[(&str, i64)],
    ) -> Restaurant {
        let mut rows = self.restaurants.rows.lock().unwrap();
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            user_id: owner,
            restaurant_name: name.to_string(),
            city: city.to_string(),
            country: "Chile".to_string(),
            delivery_price,
            estimated_delivery_time: 30,
            cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
            menu_items: menu
                .iter()
                .map(|(name, price)| MenuItem {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    price: *price,
                })
                .collect(),
            image_url: "https://res.cloudinary.com/demo/image/upload/seed.png".to_string(),
            last_updated: Utc::now() - Duration::hours(1) + Duration::minutes(rows.len() as i64),
        };
        rows.push(restaurant.clone());
        restaurant
    }

    pub fn seed_order(&self, restaurant: &Restaurant, user: &User, status: OrderStatus) -> Order {
        let item = &restaurant.menu_items[0];
        let mut order = Order::place(
            restaurant.id,
            user.id,
            delivery_details(),
            vec![CartItem {
                menu_item_id: item.id,
                quantity: 1,
                name: item.name.clone(),
            }],
            Utc::now(),
        );
        order.status = status;
        self.orders.rows.lock().unwrap().push(order.clone());
        order
    }
}

// ─── PostgreSQL ──────────────────────────────────────────────────────────────

/// Test server over the PostgreSQL repositories, with the external services
/// stubbed. Returns the payment stub so tests can inspect sessions.
pub fn create_pg_server(pool: &PgPool) -> (TestServer, Arc<StubPayments>) {
    let payments = Arc::new(StubPayments::default());
    let state = AppState::new(
        Repositories::postgres(Arc::new(pool.clone())),
        Gateways {
            identity: Arc::new(StubVerifier),
            assets: Arc::new(StubAssets::default()),
            payments: payments.clone(),
        },
        CheckoutSettings::new(&format!("{FRONTEND_URL}/"), "clp"),
    );

    (TestServer::new(unthrottled_router(state)).unwrap(), payments)
}

pub async fn create_test_user(pool: &PgPool, subject: &str) -> User {
    PgUserRepository::new(Arc::new(pool.clone()))
        .create(NewUser {
            auth0_id: subject.to_string(),
            email: format!("{}@example.com", subject.replace('|', ".")),
            name: None,
            address_line1: None,
            city: None,
            country: None,
        })
        .await
        .unwrap()
        .unwrap()
}

/// Inserts a restaurant owned by a fresh user with subject `owner`.
pub async fn create_test_restaurant(
    pool: &PgPool,
    owner: &str,
    name: &str,
    city: &str,
    cuisines: &[&str],
    menu: &[(&str, i64)],
) -> Restaurant {
    let owner = create_test_user(pool, owner).await;
    let restaurant = Restaurant::create(
        owner.id,
        RestaurantDraft {
            restaurant_name: name.to_string(),
            city: city.to_string(),
            country: "Chile".to_string(),
            delivery_price: 2500,
            estimated_delivery_time: 30,
            cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
            menu_items: menu
                .iter()
                .map(|(name, price)| MenuItemDraft {
                    id: None,
                    name: name.to_string(),
                    price: *price,
                })
                .collect(),
        },
        "https://res.cloudinary.com/demo/image/upload/1.png".to_string(),
        Utc::now(),
    );
    PgRestaurantRepository::new(Arc::new(pool.clone()))
        .insert(&restaurant)
        .await
        .unwrap();
    restaurant
}

pub fn delivery_details() -> DeliveryDetails {
    DeliveryDetails {
        email: "bea@example.com".to_string(),
        name: "Bea".to_string(),
        address_line1: "Calle Falsa 123".to_string(),
        city: "Santiago".to_string(),
    }
}

/// `Authorization` header value accepted by [`StubVerifier`] for `subject`.
pub fn bearer(subject: &str) -> String {
    format!("Bearer valid:{subject}")
}

/// Signs a webhook payload the way the payment processor does.
pub fn stripe_signature(payload: &[u8]) -> String {
    sign_payload(payload, WEBHOOK_SECRET, Utc::now().timestamp())
}

pub fn checkout_completed(order_id: &str, amount_total: i64) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "evt_test",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test",
                "amount_total": amount_total,
                "metadata": { "orderId": order_id }
            }
        }
    }))
    .unwrap()
}
