/**
 * View Port Tests
 *
 * Placement of views in front of an anchor: append, prepend, insert
 * before/after, remove and moves of views that are already present.
 */
#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::html;
    use templating::markup;
    use templating::{Document, NodeId, TemplatingError, View, ViewPort};

    const ANCHOR_HTML: &str = "<!-- anchor -->";
    const A_HTML: &str = "<span>A</span>a";
    const B_HTML: &str = "<span>B</span>b";
    const C_HTML: &str = "<span>C</span>c";
    const D_HTML: &str = "<span>D</span>d";

    struct Fixture {
        doc: Document,
        root: Vec<NodeId>,
        port: ViewPort,
        a: View,
        b: View,
        c: View,
        d: View,
    }

    impl Fixture {
        fn new() -> Self {
            let mut doc = Document::new();
            let root = markup::parse(&mut doc, ANCHOR_HTML).unwrap();
            let port = ViewPort::new(&doc, root[0]).unwrap();
            let a = view(&mut doc, A_HTML);
            let b = view(&mut doc, B_HTML);
            let c = view(&mut doc, C_HTML);
            let d = view(&mut doc, D_HTML);
            Fixture {
                doc,
                root,
                port,
                a,
                b,
                c,
                d,
            }
        }

        /// Markup of everything under the anchor's parent.
        fn html(&self) -> String {
            let parent = self.doc.parent(self.root[0]).unwrap();
            html(&self.doc, self.doc.children(parent))
        }

        fn assert_child_nodes(&self, parts: &[&str]) {
            assert_eq!(self.html(), parts.concat());
        }
    }

    fn view(doc: &mut Document, source: &str) -> View {
        let nodes = markup::parse(doc, source).unwrap();
        View::new(&nodes)
    }

    #[test]
    fn should_ignore_changes_to_the_original_node_list() {
        let mut doc = Document::new();
        let mut original = markup::parse(&mut doc, "<div></div>").unwrap();
        let view = View::new(&original);
        original.clear();
        assert!(original.is_empty());
        assert_eq!(view.nodes().len(), 1);
    }

    // ---- append ----

    #[test]
    fn should_append_in_empty_hole() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.assert_child_nodes(&[A_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_append_in_non_empty_hole() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, ANCHOR_HTML]);
    }

    // ---- prepend ----

    #[test]
    fn should_prepend_in_empty_hole() {
        let mut f = Fixture::new();
        f.port.prepend(&mut f.doc, &f.a).unwrap();
        f.assert_child_nodes(&[A_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_prepend_in_non_empty_hole() {
        let mut f = Fixture::new();
        f.port.prepend(&mut f.doc, &f.b).unwrap();
        f.port.prepend(&mut f.doc, &f.a).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_prepend_after_unrelated_siblings() {
        let mut doc = Document::new();
        let root = markup::parse(&mut doc, "<p>x</p><!-- anchor -->").unwrap();
        let mut port = ViewPort::new(&doc, root[1]).unwrap();
        let a = view(&mut doc, A_HTML);
        let b = view(&mut doc, B_HTML);
        port.append(&mut doc, &b).unwrap();
        port.prepend(&mut doc, &a).unwrap();
        let parent = doc.parent(root[1]).unwrap();
        assert_eq!(
            html(&doc, doc.children(parent)),
            ["<p>x</p>", A_HTML, B_HTML, ANCHOR_HTML].concat()
        );
    }

    // ---- insert_before ----

    #[test]
    fn should_insert_before_head() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.insert_before(&mut f.doc, &f.a, &f.b).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_insert_before_other_view() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.c).unwrap();
        f.port.insert_before(&mut f.doc, &f.b, &f.c).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, C_HTML, ANCHOR_HTML]);
    }

    // ---- insert_after ----

    #[test]
    fn should_insert_after_tail() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.insert_after(&mut f.doc, &f.b, &f.a).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_insert_after_other_view() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.c).unwrap();
        f.port.insert_after(&mut f.doc, &f.b, &f.a).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, C_HTML, ANCHOR_HTML]);
    }

    // ---- remove ----

    #[test]
    fn should_remove_the_only_item_in_a_hole() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.remove(&mut f.doc, &f.a).unwrap();
        f.assert_child_nodes(&[ANCHOR_HTML]);
        assert!(f.port.is_empty());
    }

    #[test]
    fn should_remove_the_last_item_of_a_hole() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.remove(&mut f.doc, &f.b).unwrap();
        f.assert_child_nodes(&[A_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_remove_the_first_item_of_a_hole() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.remove(&mut f.doc, &f.a).unwrap();
        f.assert_child_nodes(&[B_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_keep_removed_views_intact_for_reuse() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.remove(&mut f.doc, &f.a).unwrap();
        f.assert_child_nodes(&[B_HTML, ANCHOR_HTML]);

        assert_eq!(html(&f.doc, f.a.nodes()), A_HTML);
        assert!(f.a.nodes().iter().all(|&node| f.doc.parent(node).is_none()));

        f.port.append(&mut f.doc, &f.a).unwrap();
        f.assert_child_nodes(&[B_HTML, A_HTML, ANCHOR_HTML]);
    }

    // ---- move ----

    #[test]
    fn should_switch_head_and_tail() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.insert_before(&mut f.doc, &f.a, &f.b).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, ANCHOR_HTML]);
        assert_eq!(f.port.views(), vec![f.a.id(), f.b.id()]);
    }

    #[test]
    fn should_move_a_view_in_the_hole() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.c).unwrap();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.append(&mut f.doc, &f.d).unwrap();
        f.port.insert_before(&mut f.doc, &f.b, &f.c).unwrap();
        f.assert_child_nodes(&[A_HTML, B_HTML, C_HTML, D_HTML, ANCHOR_HTML]);
        assert_eq!(f.port.len(), 4);
    }

    #[test]
    fn should_move_with_remove_and_insert_after() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.append(&mut f.doc, &f.c).unwrap();
        f.port.remove(&mut f.doc, &f.a).unwrap();
        f.port.insert_after(&mut f.doc, &f.a, &f.c).unwrap();
        f.assert_child_nodes(&[B_HTML, C_HTML, A_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_move_with_prepend() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        f.port.append(&mut f.doc, &f.b).unwrap();
        f.port.prepend(&mut f.doc, &f.b).unwrap();
        f.assert_child_nodes(&[B_HTML, A_HTML, ANCHOR_HTML]);
        assert_eq!(f.port.len(), 2);
    }

    // ---- end-to-end ----

    #[test]
    fn should_insert_between_appended_views() {
        let mut doc = Document::new();
        let root = markup::parse(&mut doc, "<!--A-->").unwrap();
        let anchor = root[0];
        let mut port = ViewPort::new(&doc, anchor).unwrap();
        let x = View::new(&[doc.create_text("x")]);
        let y = View::new(&[doc.create_text("y")]);
        let z = View::new(&[doc.create_text("z")]);

        port.append(&mut doc, &x).unwrap();
        port.append(&mut doc, &y).unwrap();
        port.insert_before(&mut doc, &z, &y).unwrap();

        let parent = doc.parent(anchor).unwrap();
        let expected = vec![x.nodes()[0], z.nodes()[0], y.nodes()[0], anchor];
        assert_eq!(doc.children(parent).to_vec(), expected);
    }

    #[test]
    fn should_leave_the_removed_view_reusable() {
        let mut doc = Document::new();
        let root = markup::parse(&mut doc, "<!--A-->").unwrap();
        let anchor = root[0];
        let mut port = ViewPort::new(&doc, anchor).unwrap();
        let x = View::new(&[doc.create_text("x")]);
        let y = View::new(&[doc.create_text("y")]);

        port.append(&mut doc, &x).unwrap();
        port.append(&mut doc, &y).unwrap();
        port.remove(&mut doc, &x).unwrap();

        let parent = doc.parent(anchor).unwrap();
        assert_eq!(doc.children(parent).to_vec(), vec![y.nodes()[0], anchor]);
        assert_eq!(x.nodes().len(), 1);
        assert_eq!(doc.text(x.nodes()[0]), Some("x"));
    }

    // ---- errors ----

    #[test]
    fn should_reject_an_absent_reference() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        let err = f.port.insert_before(&mut f.doc, &f.b, &f.c).unwrap_err();
        assert!(matches!(err, TemplatingError::ViewNotInPort));
        let err = f.port.insert_after(&mut f.doc, &f.b, &f.c).unwrap_err();
        assert!(matches!(err, TemplatingError::ViewNotInPort));
        f.assert_child_nodes(&[A_HTML, ANCHOR_HTML]);
        assert_eq!(f.port.len(), 1);
    }

    #[test]
    fn should_reject_a_view_as_its_own_reference() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        let err = f.port.insert_after(&mut f.doc, &f.a, &f.a).unwrap_err();
        assert!(matches!(err, TemplatingError::ViewNotInPort));
        f.assert_child_nodes(&[A_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_reject_removing_an_absent_view() {
        let mut f = Fixture::new();
        f.port.append(&mut f.doc, &f.a).unwrap();
        let err = f.port.remove(&mut f.doc, &f.b).unwrap_err();
        assert!(matches!(err, TemplatingError::ViewNotInPort));
        f.assert_child_nodes(&[A_HTML, ANCHOR_HTML]);
    }

    #[test]
    fn should_reject_a_view_containing_the_port_parent() {
        let mut doc = Document::new();
        let root = markup::parse(&mut doc, "<div><!-- anchor --></div>").unwrap();
        let anchor = doc.child(root[0], 0).unwrap();
        let mut port = ViewPort::new(&doc, anchor).unwrap();
        let bad = View::new(&root);
        let err = port.append(&mut doc, &bad).unwrap_err();
        assert!(matches!(err, TemplatingError::Hierarchy(_)));
        assert!(port.is_empty());
        assert_eq!(html(&doc, &root), "<div><!-- anchor --></div>");
    }
}
