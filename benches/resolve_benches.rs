use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use siftdom::simple_node::{doc, elem, text};
use siftdom::{SimpleNode, matches, resolve};

fn build_tree(sections: usize, items: usize) -> SimpleNode {
    let mut body = elem("body");
    for _ in 0..sections {
        let mut section = elem("div").attr("class", "section");
        for i in 0..items {
            let class = if i % 3 == 0 { "item hot" } else { "item" };
            section = section.child(elem("p").attr("class", class).child(text("lorem ipsum")));
        }
        body = body.child(section);
    }
    doc().child(elem("html").child(body)).build()
}

fn bench_resolve(c: &mut Criterion) {
    let root = build_tree(20, 50);

    c.bench_function("descendant_tag", |b| {
        b.iter(|| resolve("div p", black_box(&root)).unwrap());
    });

    c.bench_function("class_filter_chain", |b| {
        b.iter(|| resolve("div.section p.item:odd", black_box(&root)).unwrap());
    });

    c.bench_function("union_groups", |b| {
        b.iter(|| resolve(".hot, .item", black_box(&root)).unwrap());
    });

    let first = resolve("p", &root).unwrap().remove(0);
    c.bench_function("matches_single_node", |b| {
        b.iter(|| matches(black_box(&first), "div.section > p").unwrap());
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
