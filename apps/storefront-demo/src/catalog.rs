//! Static product data served by the demo.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub slug: &'static str,
    pub name: &'static str,
    pub price_cents: u32,
}

impl Product {
    pub fn price(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

pub const PRODUCTS: &[Product] = &[
    Product {
        slug: "green-tea",
        name: "Green tea",
        price_cents: 850,
    },
    Product {
        slug: "teapot",
        name: "Cast iron teapot",
        price_cents: 4200,
    },
    Product {
        slug: "cups",
        name: "Set of cups",
        price_cents: 1999,
    },
    Product {
        slug: "strainer",
        name: "Strainer",
        price_cents: 450,
    },
];

pub const STAFF: &[&str] = &["ana", "bruno", "chen"];

pub fn find(slug: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|product| product.slug == slug)
}

/// Products ordered by price, cheapest first unless `descending`.
pub fn by_price(descending: bool) -> Vec<&'static Product> {
    let mut products: Vec<_> = PRODUCTS.iter().collect();
    products.sort_by_key(|product| product.price_cents);
    if descending {
        products.reverse();
    }
    products
}
