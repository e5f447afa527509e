use std::cell::RefCell;
use std::rc::Rc;

use arbor_core::{
    component, dispatch_event, h, shared, Child, Event, HandleId, Host, MemoryHost, Modifiers,
    Props, RenderError, Rendered,
};

use super::*;

fn home(_: &Props) -> Rendered {
    Ok(h!("p", Props::new(), "home"))
}

fn product(props: &Props) -> Rendered {
    Ok(h!("h1", Props::new(), props.param("slug").unwrap_or("?")))
}

fn admin_layout(props: &Props) -> Rendered {
    Ok(h!(
        "section",
        Props::new(),
        h!("h2", Props::new(), "Admin"),
        props.outlet()
    ))
}

fn admin_users(props: &Props) -> Rendered {
    Ok(h!(
        "p",
        Props::new(),
        format!("users ({})", props.route_meta("title").unwrap_or(""))
    ))
}

fn search(props: &Props) -> Rendered {
    Ok(h!(
        "p",
        Props::new(),
        format!(
            "{}|{}",
            props.query_param("q").unwrap_or(""),
            props.query_param("page").unwrap_or("")
        )
    ))
}

fn navbar(_: &Props) -> Rendered {
    Ok(h!(
        "nav",
        Props::new(),
        link("/", Props::new(), vec![Child::from("Home")]),
        link("/products/shoes", Props::new(), vec![Child::from("Shoes")]),
        link("#/products/hats", Props::new(), vec![Child::from("Hats")]),
        link("/products/new", Props::new().attr("target", "_blank"), vec![Child::from("New tab")]),
        link("https://shop.example/cart", Props::new(), vec![Child::from("Cart")]),
        link("https://elsewhere.example/", Props::new(), vec![Child::from("Away")]),
        link("//cdn.example/logo", Props::new(), vec![Child::from("Logo")])
    ))
}

fn broken(_: &Props) -> Rendered {
    Err(RenderError::new("route failed"))
}

fn missing(props: &Props) -> Rendered {
    Ok(h!("p", Props::new(), format!("nothing at {}", props.pathname())))
}

fn router_at(initial: &str) -> Router<MemoryHost> {
    router_with(initial, RouterOptions::default())
}

fn router_with(initial: &str, options: RouterOptions) -> Router<MemoryHost> {
    let host = shared(MemoryHost::new());
    let mount = host.borrow_mut().create_element("div");
    let router = Router::new(host, mount, MemoryHistory::new(initial), options);
    router.add_route("/", component!(home)).unwrap();
    router
        .add_route("/products/:slug", component!(product))
        .unwrap();
    router
        .add_route_config(
            RouteConfig::new("/admin")
                .component(component!(admin_layout))
                .child(
                    RouteConfig::new("users")
                        .component(component!(admin_users))
                        .meta("title", "People"),
                ),
        )
        .unwrap();
    router.add_route("/search", component!(search)).unwrap();
    router.add_route("/broken", component!(broken)).unwrap();
    router
        .add_route_config(RouteConfig::new("/old").redirect("/products/moved"))
        .unwrap();
    router
}

fn html(router: &Router<MemoryHost>) -> String {
    let root = router.root();
    root.host().borrow().inner_html_of(root.mount())
}

fn find_link(router: &Router<MemoryHost>, label: &str) -> HandleId {
    let root = router.root();
    let host = root.host().borrow();
    host.find_by_text(root.mount(), label)
        .and_then(|handle| {
            host.find_first(handle, &|host, candidate| host.tag_name(candidate) == Some("a"))
        })
        .expect("link rendered")
}

fn click(router: &Router<MemoryHost>, target: HandleId) -> Event {
    let event = Event::click(target);
    dispatch_event(router.root().host(), &event);
    event
}

#[test]
fn params_are_extracted_from_named_segments() {
    let router = router_at("#/products/abc-123");

    router.init().unwrap();

    assert_eq!(html(&router), "<h1>abc-123</h1>");
    let route = router.current_route().unwrap();
    assert_eq!(route.pattern.as_deref(), Some("/products/:slug"));
    assert_eq!(route.params.get("slug").map(String::as_str), Some("abc-123"));
}

#[test]
fn nested_routes_render_through_the_outlet() {
    let router = router_at("#/admin/users");
    router.init().unwrap();

    assert_eq!(
        html(&router),
        "<section><h2>Admin</h2><p>users (People)</p></section>"
    );
    assert_eq!(
        router.current_route().unwrap().pattern.as_deref(),
        Some("/admin/users")
    );

    router.navigate("/admin").unwrap();
    assert_eq!(html(&router), "<section><h2>Admin</h2></section>");
}

#[test]
fn navigating_to_the_current_path_does_nothing() {
    let router = router_at("#/search");
    router.init().unwrap();
    let renders = router.root().render_count();

    router.navigate("/search").unwrap();

    assert_eq!(router.with_history(MemoryHistory::push_count), 0);
    assert_eq!(router.root().render_count(), renders);

    router.navigate("/").unwrap();
    assert_eq!(router.with_history(MemoryHistory::push_count), 1);
    assert_eq!(router.root().render_count(), renders + 1);
    assert_eq!(
        router.with_history(|history| history.entries().to_vec()),
        ["#/search", "#/"]
    );
}

#[test]
fn unmatched_paths_render_not_found() {
    let router = router_at("#/");
    router.init().unwrap();

    router.navigate("/nowhere").unwrap();
    assert_eq!(html(&router), "<div>404 - Not Found: /nowhere</div>");
    assert!(router.current_route().unwrap().is_not_found());

    router.set_not_found(component!(missing));
    router.rerender().unwrap();
    assert_eq!(html(&router), "<p>nothing at /nowhere</p>");
}

#[test]
fn query_strings_are_decoded() {
    let router = router_at("#/");
    router.init().unwrap();

    router.navigate("/search?q=red%20shoes&page=2").unwrap();

    assert_eq!(html(&router), "<p>red shoes|2</p>");
    let route = router.current_route().unwrap();
    assert_eq!(route.pathname, "/search");
    assert_eq!(route.query.get("page").map(String::as_str), Some("2"));
    assert_eq!(router.current_path(), "/search?q=red%20shoes&page=2");
}

#[test]
fn guard_can_allow_redirect_or_cancel() {
    let router = router_at("#/");
    router.init().unwrap();
    router.before_navigate(|to, _from, proceed| match to {
        "/admin" => proceed.redirect("/search?q=login").unwrap(),
        "/broken" => {}
        _ => proceed.allow().unwrap(),
    });

    router.navigate("/products/a").unwrap();
    assert_eq!(router.current_path(), "/products/a");

    router.navigate("/admin").unwrap();
    assert_eq!(router.current_path(), "/search?q=login");

    let pushes = router.with_history(MemoryHistory::push_count);
    router.navigate("/broken").unwrap();
    assert_eq!(router.current_path(), "/search?q=login");
    assert_eq!(router.with_history(MemoryHistory::push_count), pushes);
}

#[test]
fn guard_may_resolve_later() {
    let router = router_at("#/");
    router.init().unwrap();
    let parked: Rc<RefCell<Option<Proceed>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&parked);
    router.before_navigate(move |_, from, proceed| {
        assert_eq!(from, "/");
        *slot.borrow_mut() = Some(proceed);
    });

    router.navigate("/products/later").unwrap();
    assert_eq!(router.current_path(), "/");

    let proceed = parked.borrow_mut().take().unwrap();
    assert_eq!(proceed.to(), "/products/later");
    proceed.allow().unwrap();
    assert_eq!(html(&router), "<h1>later</h1>");
}

#[test]
fn redirect_routes_forward_to_their_target() {
    let router = router_at("#/");
    router.init().unwrap();

    router.navigate("/old").unwrap();

    assert_eq!(router.current_path(), "/products/moved");
    assert_eq!(html(&router), "<h1>moved</h1>");
    assert_eq!(
        router.with_history(|history| history.entries().to_vec()),
        ["#/", "#/old", "#/products/moved"]
    );
}

#[test]
fn redirect_cycles_end_at_not_found() {
    let router = router_at("#/");
    router
        .add_route_config(RouteConfig::new("/loop-a").redirect("/loop-b"))
        .unwrap();
    router
        .add_route_config(RouteConfig::new("/loop-b").redirect("/loop-a"))
        .unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    router.after_navigate(move |route, from| {
        sink.borrow_mut()
            .push(format!("{} from {}", route.pathname, from.unwrap_or("-")));
    });
    router.init().unwrap();

    router.navigate("/loop-a").unwrap();

    assert_eq!(router.current_path(), "/loop-b");
    assert_eq!(html(&router), "<div>404 - Not Found: /loop-b</div>");
    assert!(router.current_route().unwrap().is_not_found());
    assert_eq!(*seen.borrow(), ["/ from -", "/loop-b from /loop-a"]);

    router.navigate("/").unwrap();
    assert_eq!(html(&router), "<p>home</p>");
}

#[test]
fn self_redirects_render_not_found() {
    let router = router_at("#/");
    router
        .add_route_config(RouteConfig::new("/self").redirect("/self"))
        .unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    router.after_navigate(move |route, from| {
        sink.borrow_mut()
            .push(format!("{} from {}", route.pathname, from.unwrap_or("-")));
    });
    router.init().unwrap();

    router.navigate("/self").unwrap();

    assert_eq!(router.current_path(), "/self");
    assert_eq!(html(&router), "<div>404 - Not Found: /self</div>");
    let route = router.current_route().unwrap();
    assert!(route.is_not_found());
    assert_eq!(route.pathname, "/self");
    assert_eq!(*seen.borrow(), ["/ from -", "/self from /"]);
}

#[test]
fn after_hook_sees_route_and_previous_path() {
    let router = router_at("#/");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    router.after_navigate(move |route, from| {
        sink.borrow_mut()
            .push(format!("{} from {}", route.pathname, from.unwrap_or("-")));
    });

    router.init().unwrap();
    router.navigate("/products/x").unwrap();

    assert_eq!(*seen.borrow(), ["/ from -", "/products/x from /"]);
}

#[test]
fn back_and_forward_replay_history() {
    let router = router_at("#/");
    router.init().unwrap();
    router.navigate("/products/a").unwrap();
    router.navigate("/products/b").unwrap();

    router.back().unwrap();
    assert_eq!(html(&router), "<h1>a</h1>");
    router.back().unwrap();
    assert_eq!(html(&router), "<p>home</p>");
    router.back().unwrap();
    assert_eq!(router.current_path(), "/");

    router.forward().unwrap();
    assert_eq!(router.current_path(), "/products/a");
    assert_eq!(router.with_history(MemoryHistory::push_count), 2);
}

#[test]
fn path_mode_reads_and_writes_plain_paths() {
    let options = RouterOptions {
        use_hash_routing: false,
        origin: None,
    };
    let router = router_with("/products/p1", options);
    router.init().unwrap();
    assert_eq!(html(&router), "<h1>p1</h1>");

    router.navigate("/").unwrap();

    assert_eq!(
        router.with_history(|history| history.entries().to_vec()),
        ["/products/p1", "/"]
    );
}

#[test]
fn link_clicks_are_routed_in_app() {
    let options = RouterOptions {
        origin: Some("https://shop.example".to_string()),
        ..RouterOptions::default()
    };
    let router = router_with("#/", options);
    router.set_navbar(Some(component!(navbar)));
    router.init().unwrap();

    let shoes = find_link(&router, "Shoes");
    let label = router.root().host().borrow().children(shoes)[0];
    let event = click(&router, label);
    assert!(event.default_prevented());
    assert_eq!(router.current_path(), "/products/shoes");

    click(&router, find_link(&router, "Hats"));
    assert_eq!(router.current_path(), "/products/hats");

    click(&router, find_link(&router, "Cart"));
    assert_eq!(router.current_path(), "/cart");
}

#[test]
fn some_clicks_are_left_to_the_host() {
    let options = RouterOptions {
        origin: Some("https://shop.example".to_string()),
        ..RouterOptions::default()
    };
    let router = router_with("#/", options);
    router.set_navbar(Some(component!(navbar)));
    router.init().unwrap();

    for label in ["New tab", "Away", "Logo"] {
        let event = click(&router, find_link(&router, label));
        assert!(!event.default_prevented(), "{label} was intercepted");
    }

    let shoes = find_link(&router, "Shoes");
    let modified = Event::click(shoes).with_modifiers(Modifiers {
        ctrl: true,
        ..Modifiers::default()
    });
    dispatch_event(router.root().host(), &modified);
    let middle = Event::click(shoes).with_button(1);
    dispatch_event(router.root().host(), &middle);

    assert!(!modified.default_prevented());
    assert!(!middle.default_prevented());
    assert_eq!(router.current_path(), "/");
}

#[test]
fn navbar_survives_navigation_and_route_failures() {
    let router = router_at("#/");
    router.set_navbar(Some(component!(navbar)));
    router.init().unwrap();
    let nav = {
        let root = router.root();
        let host = root.host().borrow();
        host.find_by_tag(root.mount(), "nav").unwrap()
    };

    router.navigate("/broken").unwrap();

    let root = router.root();
    let host = root.host().borrow();
    assert_eq!(host.find_by_tag(root.mount(), "nav"), Some(nav));
    assert!(host.text_content(root.mount()).contains("Something went wrong."));
}
