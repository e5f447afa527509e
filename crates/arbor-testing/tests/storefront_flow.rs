use std::cell::RefCell;
use std::rc::Rc;

use arbor_core::{use_effect, use_memo, use_reducer, PropValue};
use arbor_testing::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Cart {
    items: Vec<&'static str>,
}

enum CartAction {
    Add(&'static str),
    Clear,
}

fn cart_reducer(cart: &Cart, action: CartAction) -> Cart {
    match action {
        CartAction::Add(item) => {
            let mut items = cart.items.clone();
            items.push(item);
            Cart { items }
        }
        CartAction::Clear => Cart { items: Vec::new() },
    }
}

fn shop(_: &Props) -> Rendered {
    let (cart, dispatch) = use_reducer(cart_reducer, Cart { items: Vec::new() });
    let total = use_memo(|| cart.items.len(), cart.items.len());
    let add = dispatch.clone();
    Ok(h!(
        "main",
        Props::new(),
        h!("p", Props::new(), format!("{total} in cart")),
        h!(
            "button",
            Props::new().on("click", move |_| add.dispatch(CartAction::Add("tea"))),
            "Add tea"
        ),
        h!(
            "button",
            Props::new().on("click", move |_| dispatch.dispatch(CartAction::Clear)),
            "Clear"
        )
    ))
}

#[test]
fn cart_actions_flow_through_the_reducer() {
    let mut rule = ArborTestRule::new();
    rule.set_content(component!(shop), Props::new()).unwrap();

    rule.click_text("Add tea").unwrap();
    rule.click_text("Add tea").unwrap();
    assert_contains_text(&rule.html(), "<p>2 in cart</p>", "after adding");

    rule.click_text("Clear").unwrap();
    assert_contains_text(&rule.html(), "<p>0 in cart</p>", "after clearing");
}

fn product_list(props: &Props) -> Rendered {
    let order = props.any::<Vec<&'static str>>("order").unwrap_or_default();
    Ok(h!(
        "ul",
        Props::new(),
        order
            .iter()
            .map(|name| h!("li", Props::new().with_key(*name), *name))
            .collect::<Vec<_>>()
    ))
}

fn list_props(order: Vec<&'static str>) -> Props {
    Props::new().set_any("order", order)
}

#[test]
fn reordering_products_moves_the_least() {
    let mut rule = ArborTestRule::new();
    rule.set_content(
        component!(product_list),
        list_props(vec!["a", "b", "c", "d", "e"]),
    )
    .unwrap();
    let first = rule.find_by_text("a").unwrap();
    rule.reset_mutations();

    rule.set_content(
        component!(product_list),
        list_props(vec!["b", "c", "d", "e", "a"]),
    )
    .unwrap();

    assert_structure_stable_but_moves(&rule, 1);
    assert_eq!(rule.find_by_text("a"), Some(first));
    assert_eq!(rule.text(), "bcdea");
}

fn assert_structure_stable_but_moves(rule: &ArborTestRule, moves: usize) {
    let stats = rule.mutations();
    assert_moves(&stats, moves, "rotation");
    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 0);
}

fn titled(props: &Props) -> Rendered {
    let title = props.text("title").unwrap_or_default().to_string();
    let log = props.any::<Rc<RefCell<Vec<String>>>>("log");
    let seen = title.clone();
    use_effect(
        move |_| {
            if let Some(log) = log {
                log.borrow_mut().push(seen);
            }
        },
        title.clone(),
    );
    Ok(h!("h1", Props::new(), title))
}

#[test]
fn effects_follow_their_dependencies() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let props = |title: &str| {
        Props::new()
            .set("title", PropValue::from(title))
            .set_any("log", Rc::clone(&log))
    };
    let mut rule = ArborTestRule::new();

    rule.set_content(component!(titled), props("Shop")).unwrap();
    rule.set_content(component!(titled), props("Shop")).unwrap();
    rule.set_content(component!(titled), props("Cart")).unwrap();

    assert_eq!(*log.borrow(), ["Shop", "Cart"]);
}

fn catalogue(props: &Props) -> Rendered {
    Ok(h!(
        "section",
        Props::new(),
        h!("h2", Props::new(), "Catalogue"),
        props.outlet()
    ))
}

fn item(props: &Props) -> Rendered {
    Ok(h!("p", Props::new(), format!("item {}", props.param("sku").unwrap_or("?"))))
}

fn menu(_: &Props) -> Rendered {
    Ok(h!(
        "nav",
        Props::new(),
        link("/catalogue/tea-1", Props::new(), vec!["Tea".into()]),
        link("/catalogue/cup-2", Props::new(), vec!["Cup".into()])
    ))
}

#[test]
fn nested_catalogue_navigation_by_links() {
    let rule = RouterTestRule::new("#/catalogue")
        .route_config(
            RouteConfig::new("/catalogue")
                .component(component!(catalogue))
                .child(RouteConfig::new(":sku").component(component!(item))),
        )
        .unwrap();
    rule.router().set_navbar(Some(component!(menu)));
    rule.start().unwrap();
    assert_not_contains_text(&rule.html(), "<p>", "catalogue index");

    rule.click_link("Tea").unwrap();
    assert_contains_text(
        &rule.html(),
        "<section><h2>Catalogue</h2><p>item tea-1</p></section>",
        "tea",
    );

    rule.click_link("Cup").unwrap();
    rule.router().back().unwrap();
    assert_eq!(rule.current_path(), "/catalogue/tea-1");
    assert_eq!(
        rule.history(),
        ["#/catalogue", "#/catalogue/tea-1", "#/catalogue/cup-2"]
    );
}
