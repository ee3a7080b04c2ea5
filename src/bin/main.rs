use arena_avl::AvlTree;

fn main() {
    let mut tree: AvlTree<i32> = AvlTree::new();

    for value in [5, 3, 7, 2, 10, 30, 70, 20] {
        tree.insert(value);
        tree.assert_invariants();
        println!("{:?}", tree.iter().copied().collect::<Vec<_>>());
    }

    println!("height: {}", tree.height());
    println!("pre order:  {:?}", tree.pre_order().copied().collect::<Vec<_>>());
    println!("post order: {:?}", tree.post_order().copied().collect::<Vec<_>>());

    tree.remove(&7);
    tree.assert_invariants();
    println!("after removing 7: {:?}", tree.iter().copied().collect::<Vec<_>>());

    let mut dot = String::new();
    tree.dotgraph("demo", &mut dot).unwrap();
    println!("{dot}");
}
