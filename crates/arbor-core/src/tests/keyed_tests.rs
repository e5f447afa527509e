use super::*;
use crate::reconcile::longest_increasing;

struct Fixture {
    root: Root<MemoryHost>,
}

impl Fixture {
    fn new() -> Self {
        let host = shared(MemoryHost::new());
        let mount = host.borrow_mut().create_element("ul");
        Self {
            root: Root::new(host, mount),
        }
    }

    fn render(&self, node: Node) {
        self.root.render_node(node).unwrap();
    }

    fn html(&self) -> String {
        self.root.host().borrow().inner_html_of(self.root.mount())
    }

    fn handles(&self) -> Vec<HandleId> {
        self.root.host().borrow().children(self.root.mount())
    }

    fn reset(&self) {
        self.root.host().borrow_mut().reset_mutations();
    }

    fn mutations(&self) -> MutationStats {
        self.root.host().borrow().mutations()
    }
}

fn keyed(keys: &[u32]) -> Node {
    Node::fragment(
        keys.iter()
            .map(|key| h!("li", Props::new().with_key(*key), key.to_string()))
            .collect(),
    )
}

fn items(html: &[u32]) -> String {
    html.iter().map(|key| format!("<li>{key}</li>")).collect()
}

#[test]
fn rotation_moves_a_single_handle() {
    let fixture = Fixture::new();
    fixture.render(keyed(&[1, 2, 3]));
    let before = fixture.handles();
    fixture.reset();

    fixture.render(keyed(&[3, 1, 2]));

    assert_eq!(fixture.html(), items(&[3, 1, 2]));
    assert_eq!(fixture.handles(), vec![before[2], before[0], before[1]]);
    let stats = fixture.mutations();
    assert_eq!(stats.moved, 1);
    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 0);
}

#[test]
fn reversal_keeps_one_handle_in_place() {
    let fixture = Fixture::new();
    fixture.render(keyed(&[1, 2, 3, 4]));
    let before = fixture.handles();
    fixture.reset();

    fixture.render(keyed(&[4, 3, 2, 1]));

    assert_eq!(fixture.html(), items(&[4, 3, 2, 1]));
    let reversed: Vec<_> = before.into_iter().rev().collect();
    assert_eq!(fixture.handles(), reversed);
    assert_eq!(fixture.mutations().moved, 3);
}

#[test]
fn middle_replacement_touches_only_the_middle() {
    let fixture = Fixture::new();
    fixture.render(keyed(&[1, 2, 3, 4]));
    let before = fixture.handles();
    fixture.reset();

    fixture.render(keyed(&[1, 5, 3, 4]));

    assert_eq!(fixture.html(), items(&[1, 5, 3, 4]));
    let after = fixture.handles();
    assert_eq!(after[0], before[0]);
    assert_eq!(&after[2..], &before[2..]);
    let stats = fixture.mutations();
    assert_eq!(stats.moved, 0);
    assert_eq!(stats.created, 2);
    assert_eq!(stats.removed, 1);
}

#[test]
fn insertions_and_removals_around_survivors() {
    let fixture = Fixture::new();
    fixture.render(keyed(&[1, 2, 3]));

    fixture.render(keyed(&[0, 1, 3, 4]));
    assert_eq!(fixture.html(), items(&[0, 1, 3, 4]));
    assert_eq!(fixture.mutations().moved, 0);

    fixture.render(keyed(&[4]));
    assert_eq!(fixture.html(), items(&[4]));

    fixture.render(keyed(&[]));
    assert_eq!(fixture.html(), "");
}

#[test]
fn unkeyed_swap_replaces_instead_of_moving() {
    let fixture = Fixture::new();
    fixture.render(Node::fragment(vec![
        Node::text("x"),
        h!("div", Props::new()),
    ]));
    fixture.reset();

    fixture.render(Node::fragment(vec![
        h!("div", Props::new()),
        Node::text("x"),
    ]));

    assert_eq!(fixture.html(), "<div></div>x");
    let stats = fixture.mutations();
    assert_eq!(stats.moved, 0);
    assert_eq!(stats.created, 2);
    assert_eq!(stats.removed, 2);
}

#[test]
fn duplicate_keys_mount_fresh_instances() {
    let fixture = Fixture::new();
    let row = |key: &str, text: &str| h!("li", Props::new().with_key(key), text);
    fixture.render(Node::fragment(vec![
        row("a", "a"),
        row("d", "d1"),
        row("d", "d2"),
    ]));
    fixture.reset();

    fixture.render(Node::fragment(vec![
        row("d", "first"),
        row("d", "second"),
        row("a", "a"),
    ]));

    assert_eq!(
        fixture.html(),
        "<li>first</li><li>second</li><li>a</li>"
    );
    assert_eq!(fixture.mutations().removed, 1);
}

#[test]
fn same_key_with_a_new_tag_is_remounted() {
    let fixture = Fixture::new();
    fixture.render(Node::fragment(vec![
        h!("li", Props::new().with_key(1), "x"),
        h!("li", Props::new().with_key(2), "y"),
    ]));
    let before = fixture.handles();

    fixture.render(Node::fragment(vec![
        h!("li", Props::new().with_key(2), "y"),
        h!("p", Props::new().with_key(1), "x"),
    ]));

    assert_eq!(fixture.html(), "<li>y</li><p>x</p>");
    let after = fixture.handles();
    assert_eq!(after[0], before[1]);
    assert_ne!(after[1], before[0]);
}

#[test]
fn keyed_fragments_move_all_their_handles() {
    let fixture = Fixture::new();
    let group = |key: &str| {
        Node::fragment(vec![
            Node::text(format!("{key}1")),
            Node::text(format!("{key}2")),
        ])
        .with_key(key)
    };
    fixture.render(Node::fragment(vec![group("a"), group("b")]));
    fixture.reset();

    fixture.render(Node::fragment(vec![group("b"), group("a")]));

    assert_eq!(fixture.html(), "b1b2a1a2");
    let stats = fixture.mutations();
    assert_eq!(stats.moved, 2);
    assert_eq!(stats.created, 0);
}

#[test]
fn unkeyed_prefix_is_matched_before_the_keyed_window() {
    let fixture = Fixture::new();
    let list = |keys: &[u32]| {
        let mut children = vec![Node::text("head")];
        children.extend(
            keys.iter()
                .map(|key| h!("li", Props::new().with_key(*key), key.to_string())),
        );
        Node::fragment(children)
    };
    fixture.render(list(&[1, 2]));
    let head = fixture.handles()[0];
    fixture.reset();

    fixture.render(list(&[2, 1]));

    assert_eq!(fixture.html(), format!("head{}", items(&[2, 1])));
    assert_eq!(fixture.handles()[0], head);
    assert_eq!(fixture.mutations().moved, 1);
}

#[test]
fn dropping_keys_falls_back_to_positions() {
    let fixture = Fixture::new();
    fixture.render(keyed(&[1, 2]));

    fixture.render(Node::fragment(vec![
        h!("li", Props::new(), "one"),
        h!("li", Props::new(), "two"),
    ]));

    assert_eq!(fixture.html(), "<li>one</li><li>two</li>");
    assert_eq!(fixture.mutations().moved, 0);
}

#[test]
fn components_keep_state_when_reordered() {
    fn counter(props: &Props) -> Rendered {
        let (count, _) = use_state(|| 0);
        let label = props.text("label").unwrap_or_default().to_string();
        Ok(h!("li", Props::new(), format!("{label}:{count}")))
    }

    let fixture = Fixture::new();
    let list = |labels: &[&str]| {
        Node::fragment(
            labels
                .iter()
                .map(|label| {
                    Node::component(
                        component!(counter),
                        Props::new().with_key(*label).set("label", *label),
                    )
                })
                .collect(),
        )
    };
    fixture.render(list(&["a", "b", "c"]));
    let before = fixture.handles();

    fixture.render(list(&["c", "b", "a"]));

    assert_eq!(fixture.html(), "<li>c:0</li><li>b:0</li><li>a:0</li>");
    assert_eq!(fixture.handles(), vec![before[2], before[1], before[0]]);
}

#[test]
fn longest_increasing_marks_a_maximal_run() {
    assert_eq!(longest_increasing(&[]), Vec::<bool>::new());
    assert_eq!(longest_increasing(&[3, 1, 2]), vec![false, true, true]);
    assert_eq!(
        longest_increasing(&[1, 2, 3, 4]),
        vec![true, true, true, true]
    );
    assert_eq!(
        longest_increasing(&[4, 3, 2, 1]),
        vec![false, false, false, true]
    );
}

#[test]
fn longest_increasing_skips_new_positions() {
    let stable = longest_increasing(&[0, 2, 0, 1, 3]);

    assert!(!stable[0]);
    assert!(!stable[2]);
    assert_eq!(stable.iter().filter(|&&flag| flag).count(), 2);
    assert!(stable[4]);
}
