use std::rc::Rc;

use super::*;

fn mount_point() -> (SharedHost<MemoryHost>, HandleId) {
    let host = shared(MemoryHost::new());
    let mount = host.borrow_mut().create_element("div");
    (host, mount)
}

fn html(root: &Root<MemoryHost>) -> String {
    root.host().borrow().inner_html_of(root.mount())
}

fn reset(root: &Root<MemoryHost>) {
    root.host().borrow_mut().reset_mutations();
}

fn mutations(root: &Root<MemoryHost>) -> MutationStats {
    root.host().borrow().mutations()
}

fn badge(props: &Props) -> Rendered {
    Ok(h!(
        "span",
        Props::new().class("badge"),
        props.text("label").unwrap_or_default()
    ))
}

fn flaky(props: &Props) -> Rendered {
    if props.flag("fail") {
        return Err(RenderError::new("boom"));
    }
    Ok(h!("p", Props::new(), "recovered"))
}

fn page(flag: bool) -> Node {
    h!(
        "main",
        Props::new(),
        h!("h1", Props::new(), "title"),
        Node::boundary(Node::component(
            component!(flaky),
            Props::new().set("fail", flag)
        )),
        h!("footer", Props::new(), "footer")
    )
}

fn sample_tree() -> Node {
    h!(
        "section",
        Props::new()
            .class("card")
            .attr("id", "main")
            .attr("value", "typed")
            .attr("disabled", true)
            .style("fontSize", "12px"),
        h!("h2", Props::new(), "Heading"),
        Node::fragment(vec![Node::text("one"), Node::text("two")]),
        Node::component(component!(badge), Props::new().set("label", "new")),
        h!(
            "ul",
            Props::new(),
            (1..=3)
                .map(|i| h!("li", Props::new().with_key(i), format!("item {i}")))
                .collect::<Vec<_>>()
        )
    )
}

#[test]
fn identical_tree_patches_without_mutations() {
    let (host, mount) = mount_point();
    let root = Root::new(host, mount);
    root.render_node(sample_tree()).unwrap();
    let before = html(&root);
    reset(&root);

    root.render_node(sample_tree()).unwrap();

    assert_eq!(mutations(&root), MutationStats::default());
    assert_eq!(html(&root), before);
}

#[test]
fn equal_text_is_not_rewritten() {
    let (host, mount) = mount_point();
    let root = Root::new(host, mount);
    root.render_node(Node::text("a")).unwrap();
    reset(&root);

    root.render_node(Node::text("a")).unwrap();
    assert_eq!(mutations(&root).total(), 0);

    root.render_node(Node::text("b")).unwrap();
    let stats = mutations(&root);
    assert_eq!(stats.text_writes, 1);
    assert_eq!(stats.total(), 1);
    assert_eq!(html(&root), "b");
}

#[test]
fn tag_change_replaces_at_the_same_position() {
    let (host, mount) = mount_point();
    let root = Root::new(host, mount);
    let tree = |middle: &str| {
        Node::fragment(vec![
            h!("header", Props::new()),
            Node::element(middle, Props::new(), vec![Node::text("x")]),
            h!("footer", Props::new()),
        ])
    };
    root.render_node(tree("div")).unwrap();

    root.render_node(tree("span")).unwrap();

    assert_eq!(html(&root), "<header></header><span>x</span><footer></footer>");
}

#[test]
fn fragment_growth_mounts_before_the_following_sibling() {
    let (host, mount) = mount_point();
    let root = Root::new(host, mount);
    let tree = |items: &[&str]| {
        Node::fragment(vec![
            h!("p", Props::new(), "start"),
            Node::fragment(items.iter().map(|item| Node::text(*item)).collect()),
            h!("p", Props::new(), "end"),
        ])
    };
    root.render_node(tree(&["a", "b"])).unwrap();

    root.render_node(tree(&["a", "b", "c"])).unwrap();
    assert_eq!(html(&root), "<p>start</p>abc<p>end</p>");

    root.render_node(tree(&[])).unwrap();
    assert_eq!(html(&root), "<p>start</p><p>end</p>");
}

#[test]
fn boundary_contains_render_errors() {
    let (host, mount) = mount_point();
    let root = Root::new(host, mount);

    root.render_node(page(true)).unwrap();
    assert_eq!(
        html(&root),
        "<main><h1>title</h1><div style=\"color:red;\">⚠️ Something went wrong.</div><footer>footer</footer></main>"
    );

    root.render_node(page(false)).unwrap();
    assert_eq!(
        html(&root),
        "<main><h1>title</h1><p>recovered</p><footer>footer</footer></main>"
    );

    root.render_node(page(true)).unwrap();
    assert!(html(&root).contains("Something went wrong."));
    assert!(html(&root).contains("<footer>footer</footer>"));
}

#[test]
fn failed_update_outside_a_boundary_keeps_the_previous_tree() {
    let (host, mount) = mount_point();
    let root = Root::new(host, mount);
    let tree = |fail: bool| {
        h!(
            "div",
            Props::new(),
            Node::component(component!(flaky), Props::new().set("fail", fail))
        )
    };
    root.render_node(tree(false)).unwrap();

    let err = root.render_node(tree(true)).unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::Render(ref render) if render.component() == Some("flaky")
    ));
    assert_eq!(html(&root), "<div><p>recovered</p></div>");
}

#[test]
fn unmount_releases_handles_and_clears_refs() {
    let (host, mount) = mount_point();
    let root = Root::new(Rc::clone(&host), mount);
    let holder = RefHolder::<Option<HandleId>>::new(None);
    root.render_node(h!(
        "div",
        Props::new().node_ref(holder.clone()),
        h!("span", Props::new(), "child")
    ))
    .unwrap();
    assert!(holder.current().is_some());

    root.render_node(Node::empty()).unwrap();

    assert_eq!(holder.current(), None);
    assert_eq!(host.borrow().len(), 1);
    assert_eq!(root.instance_count(), 1);
}

#[test]
fn indexed_strategy_never_moves() {
    let (host, mount) = mount_point();
    let root = Root::with_options(
        host,
        mount,
        RootOptions {
            child_diff: ChildDiffStrategy::Indexed,
            ..RootOptions::default()
        },
    );
    let list = |keys: &[u32]| {
        Node::fragment(
            keys.iter()
                .map(|key| h!("li", Props::new().with_key(*key), key.to_string()))
                .collect(),
        )
    };
    root.render_node(list(&[1, 2, 3])).unwrap();
    reset(&root);

    root.render_node(list(&[3, 1, 2])).unwrap();

    assert_eq!(html(&root), "<li>3</li><li>1</li><li>2</li>");
    assert_eq!(mutations(&root).moved, 0);
}

