use arbor_core::{h, shared, Host, MemoryHost, Node, Props, Root};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn rows(keys: impl Iterator<Item = u32>) -> Node {
    Node::fragment(
        keys.map(|key| h!("li", Props::new().with_key(key).class("row"), key.to_string()))
            .collect(),
    )
}

fn mounted(count: u32) -> Root<MemoryHost> {
    let host = shared(MemoryHost::new());
    let mount = host.borrow_mut().create_element("ul");
    let root = Root::new(host, mount);
    root.render_node(rows(0..count)).expect("initial render");
    root
}

fn keyed_reverse(c: &mut Criterion) {
    c.bench_function("keyed_reverse_1000", |b| {
        b.iter_batched(
            || mounted(1000),
            |root| root.render_node(rows((0..1000).rev())).expect("render"),
            BatchSize::SmallInput,
        );
    });
}

fn keyed_swap_ends(c: &mut Criterion) {
    c.bench_function("keyed_swap_ends_1000", |b| {
        b.iter_batched(
            || mounted(1000),
            |root| {
                let keys = std::iter::once(999)
                    .chain(1..999)
                    .chain(std::iter::once(0));
                root.render_node(rows(keys)).expect("render");
            },
            BatchSize::SmallInput,
        );
    });
}

fn unchanged_rerender(c: &mut Criterion) {
    let root = mounted(1000);
    c.bench_function("unchanged_rerender_1000", |b| {
        b.iter(|| root.render_node(rows(0..1000)).expect("render"));
    });
}

criterion_group!(benches, keyed_reverse, keyed_swap_ends, unchanged_rerender);
criterion_main!(benches);
