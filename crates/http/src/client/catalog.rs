//! Catalog API client methods

use super::{ApiClient, ClientError};
use crate::types::{CategoryPage, PageQuery, Product, ProductPage};
use reqwest::Method;

impl ApiClient {
    /// List products
    pub async fn products(&self, query: &PageQuery) -> Result<ProductPage, ClientError> {
        let request = self.request(Method::GET, "/public/products").query(query);
        self.execute(request).await
    }

    /// List products in a category
    pub async fn products_by_category(
        &self,
        category_id: i64,
        query: &PageQuery,
    ) -> Result<ProductPage, ClientError> {
        let request = self
            .request(
                Method::GET,
                &format!("/public/categories/{category_id}/products"),
            )
            .query(query);
        self.execute(request).await
    }

    /// Search products by keyword
    pub async fn search_products(
        &self,
        keyword: &str,
        query: &PageQuery,
    ) -> Result<ProductPage, ClientError> {
        let path = format!("/public/products/keyword/{}", encode_segment(keyword));
        let request = self.request(Method::GET, &path).query(query);
        self.execute(request).await
    }

    /// List categories
    pub async fn categories(&self, query: &PageQuery) -> Result<CategoryPage, ClientError> {
        let request = self.request(Method::GET, "/public/categories").query(query);
        self.execute(request).await
    }

    /// Add a product to a category (admin only)
    pub async fn add_product(
        &self,
        category_id: i64,
        product: &Product,
    ) -> Result<Product, ClientError> {
        self.post(&format!("/admin/categories/{category_id}/product"), product)
            .await
    }
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("dumbbell"), "dumbbell");
        assert_eq!(encode_segment("iron dumbbell"), "iron%20dumbbell");
        assert_eq!(encode_segment("a/b+c"), "a%2Fb%2Bc");
    }
}
