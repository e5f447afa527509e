use std::cell::Cell;
use std::rc::Rc;

use arbor_core::{
    component, dispatch_event, h, shared, use_effect, use_memo, use_state, Event, Host, MemoryHost,
    Node, Props, RenderError, Rendered,
};
use arbor_router::{
    link, MemoryHistory, RouteConfig, RouteError, RouteProps, Router, RouterError, RouterOptions,
};

use crate::catalog::{self, STAFF};

const STOREFRONT: &str = "storefront";

fn navbar(_: &Props) -> Rendered {
    Ok(h!(
        "nav",
        Props::new(),
        link("/", Props::new(), vec!["Home".into()]),
        link("/products", Props::new(), vec!["Products".into()]),
        link("/admin/staff", Props::new(), vec!["Staff".into()]),
    ))
}

fn home(_: &Props) -> Rendered {
    Ok(h!(
        "section",
        Props::new(),
        h!("h1", Props::new(), "Arbor Tea Shop"),
        h!("p", Props::new(), format!("{} products in stock", catalog::PRODUCTS.len()))
    ))
}

fn product_list(_: &Props) -> Rendered {
    let (descending, set_descending) = use_state(|| false);
    let products = use_memo(|| catalog::by_price(descending), descending);
    let rows: Vec<Node> = products
        .iter()
        .map(|product| {
            h!(
                "li",
                Props::new().with_key(product.slug),
                link(
                    &format!("/products/{}", product.slug),
                    Props::new(),
                    vec![product.name.into()]
                ),
                h!("span", Props::new().class("price"), product.price())
            )
        })
        .collect();
    let toggle = if descending {
        "Cheapest first"
    } else {
        "Priciest first"
    };
    Ok(h!(
        "section",
        Props::new(),
        h!("h2", Props::new(), "Products"),
        h!(
            "button",
            Props::new().on("click", move |_| set_descending.update(|current| !current)),
            toggle
        ),
        h!("ul", Props::new().class("products"), rows)
    ))
}

fn product_detail(props: &Props) -> Rendered {
    let slug = props.param("slug").unwrap_or_default().to_string();
    let product = use_memo(|| catalog::find(&slug), slug.clone());
    let Some(product) = product else {
        return Err(RenderError::new(format!("unknown product `{slug}`")));
    };
    let viewed = slug.clone();
    use_effect(
        move |_| log::info!(target: STOREFRONT, "viewing {viewed}"),
        slug,
    );
    Ok(h!(
        "article",
        Props::new(),
        h!("h2", Props::new(), product.name),
        h!("p", Props::new().class("price"), product.price()),
        link("/products", Props::new(), vec!["Back to products".into()])
    ))
}

fn admin_layout(props: &Props) -> Rendered {
    Ok(h!(
        "section",
        Props::new().class("admin"),
        h!("h2", Props::new(), "Admin"),
        props.outlet()
    ))
}

fn admin_staff(props: &Props) -> Rendered {
    let title = props.route_meta("title").unwrap_or("Staff");
    let rows: Vec<Node> = STAFF
        .iter()
        .map(|name| h!("li", Props::new().with_key(*name), *name))
        .collect();
    Ok(h!(
        "div",
        Props::new(),
        h!("h3", Props::new(), title),
        h!("ul", Props::new(), rows)
    ))
}

fn login(_: &Props) -> Rendered {
    Ok(h!("p", Props::new(), "Please sign in to continue."))
}

/// The demo shop: a router over an in-memory host and a sign-in flag read
/// by the admin guard.
pub struct Storefront {
    router: Router<MemoryHost>,
    signed_in: Rc<Cell<bool>>,
}

impl Storefront {
    pub fn new(initial: &str) -> Result<Self, RouteError> {
        let host = shared(MemoryHost::new());
        let mount = host.borrow_mut().create_element("div");
        let router = Router::new(
            host,
            mount,
            MemoryHistory::new(initial),
            RouterOptions::default(),
        );
        router.add_route("/", component!(home))?;
        router.add_route("/products", component!(product_list))?;
        router.add_route("/products/:slug", component!(product_detail))?;
        router.add_route_config(RouteConfig::new("/shop").redirect("/products"))?;
        router.add_route_config(
            RouteConfig::new("/admin")
                .component(component!(admin_layout))
                .child(
                    RouteConfig::new("staff")
                        .component(component!(admin_staff))
                        .meta("title", "Staff on shift"),
                ),
        )?;
        router.add_route("/login", component!(login))?;
        router.set_navbar(Some(component!(navbar)));

        let signed_in = Rc::new(Cell::new(false));
        let session = Rc::clone(&signed_in);
        router.before_navigate(move |to, _from, proceed| {
            let result = if to.starts_with("/admin") && !session.get() {
                log::info!(target: STOREFRONT, "{to} needs a signed-in user");
                proceed.redirect("/login")
            } else {
                proceed.allow()
            };
            if let Err(err) = result {
                log::error!(target: STOREFRONT, "navigation to {to} failed: {err}");
            }
        });
        router.after_navigate(|route, from| {
            log::debug!(
                target: STOREFRONT,
                "rendered {} (from {})",
                route.pathname,
                from.unwrap_or("start")
            );
        });
        Ok(Self { router, signed_in })
    }

    pub fn start(&self) -> Result<(), RouterError> {
        self.router.init()
    }

    pub fn router(&self) -> &Router<MemoryHost> {
        &self.router
    }

    pub fn sign_in(&self) {
        self.signed_in.set(true);
    }

    pub fn html(&self) -> String {
        let root = self.router.root();
        root.host().borrow().inner_html_of(root.mount())
    }

    /// Clicks the first element whose text is `text`. Returns `false` when
    /// there is none.
    pub fn click_text(&self, text: &str) -> bool {
        let root = self.router.root();
        let target = root.host().borrow().find_by_text(root.mount(), text);
        let Some(target) = target else {
            log::warn!(target: STOREFRONT, "nothing labelled {text:?}");
            return false;
        };
        dispatch_event(root.host(), &Event::click(target));
        true
    }
}
