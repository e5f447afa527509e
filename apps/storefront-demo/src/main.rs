use storefront_demo::app::Storefront;

fn show(step: &str, store: &Storefront) {
    println!("--- {step} [{}] ---", store.router().current_path());
    println!("{}", store.html());
    println!();
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Arbor Storefront ===");
    println!("A scripted session against the in-memory host:");
    println!("  - keyed product list re-sorted in place");
    println!("  - nested admin routes behind a sign-in guard");
    println!("  - render errors contained by the route boundary");
    println!();

    let store = Storefront::new("#/")?;
    store.start()?;
    show("home", &store);

    store.click_text("Products");
    show("products", &store);

    store.click_text("Priciest first");
    show("sorted", &store);

    store.click_text("Cast iron teapot");
    show("detail", &store);

    store.router().navigate("/admin/staff")?;
    show("guarded", &store);

    store.sign_in();
    store.router().navigate("/admin/staff")?;
    show("admin", &store);

    store.router().navigate("/products/unknown")?;
    show("missing product", &store);

    store.router().navigate("/shop")?;
    show("redirect", &store);

    store.router().back()?;
    show("back", &store);

    Ok(())
}
