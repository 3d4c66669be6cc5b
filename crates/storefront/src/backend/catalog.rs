//! Product catalog lookups, cached via `moka`.

use cinnamon_core::{Product, ProductId};
use tracing::{debug, instrument};

use super::{BackendClient, BackendError, Service, read_json};

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products,
    Category(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

impl BackendClient {
    /// Get every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) = self.cache().get(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.url(Service::Catalog, "/products");
        let response = self.http().get(&url).send().await?;
        let products: Vec<Product> = read_json(response).await?;

        self.cache()
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get the products in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn get_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, BackendError> {
        let cache_key = CacheKey::Category(category.to_string());

        if let Some(CacheValue::Products(products)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(products);
        }

        let url = self.url(
            Service::Catalog,
            &format!("/products/category/{}", urlencoding::encode(category)),
        );
        let response = self.http().get(&url).send().await?;
        let products: Vec<Product> = read_json(response).await?;

        self.cache()
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for an unknown id, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.url(Service::Catalog, &format!("/products/{id}"));
        let response = self.http().get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(format!("Product not found: {id}")));
        }
        // Some catalog builds answer an unknown id with 200 and `null`.
        let product: Option<Product> = read_json(response).await?;
        let product =
            product.ok_or_else(|| BackendError::NotFound(format!("Product not found: {id}")))?;

        self.cache()
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.cache().invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::BackendUrls;

    fn client(server: &MockServer) -> BackendClient {
        let base = Url::parse(&server.uri()).unwrap();
        BackendClient::new(BackendUrls::single(&base), Duration::from_secs(60))
    }

    fn product_json(id: i64, name: &str, price: f64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "category": "powder",
            "price": price,
            "stock_quantity": 25,
            "imageFilename": format!("{id}.jpg"),
        })
    }

    #[tokio::test]
    async fn test_get_product_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(product_json(1, "Cinnamon Powder", 20.0)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let first = client.get_product(ProductId::new(1)).await.unwrap();
        let second = client.get_product(ProductId::new(1)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.price, Decimal::from(20));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_product(ProductId::new(9))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_category_is_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/category/essential%20oil"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                product_json(3, "Cinnamon Leaf Oil", 24.99)
            ])))
            .mount(&server)
            .await;

        let products = client(&server)
            .get_products_by_category("essential oil")
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().unit_label(), "per 100ml");
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server).get_products().await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
