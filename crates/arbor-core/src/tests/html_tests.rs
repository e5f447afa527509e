use super::*;

fn greeting(props: &Props) -> Rendered {
    let (name, _) = use_state(|| "stranger".to_string());
    use_effect(
        |_| -> EffectResult { panic!("effects never run while rendering to a string") },
        (),
    );
    Ok(h!(
        "p",
        Props::new(),
        format!("{}, {name}", props.text("salutation").unwrap_or("Hello"))
    ))
}

fn broken(_: &Props) -> Rendered {
    Err(RenderError::new("no data"))
}

#[test]
fn escapes_the_five_special_characters() {
    assert_eq!(
        escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
}

#[test]
fn sanitize_strips_active_content() {
    let dirty = concat!(
        "<div onmouseover='x()'>ok</div>",
        "<SCRIPT type=\"text/javascript\">evil()</SCRIPT>",
        "<iframe src=\"//ads\"></iframe>",
        "<style>body{}</style>",
        "<embed src=\"a.swf\">",
        "<a href=\"JavaScript:go()\">link</a>"
    );

    let clean = sanitize_html(dirty);

    assert_eq!(clean, "<div>ok</div><a>link</a>");
}

#[test]
fn sanitize_does_not_reassemble_what_it_strips() {
    let nested_url = sanitize_html("<a href=\"javajavascript:script:alert(1)\">x</a>");
    let nested_tag = sanitize_html("<scr<script>ipt>alert(1)");

    assert_eq!(nested_url, "<a>x</a>");
    assert!(!nested_url.to_lowercase().contains("javascript:"));
    assert_eq!(nested_tag, "alert(1)");
    assert!(!nested_tag.contains("<script"));
}

#[test]
fn sanitize_keeps_harmless_markup() {
    let markup = "<ul class=\"x\"><li><b>one</b></li></ul>";

    assert_eq!(sanitize_html(markup), markup);
}

#[test]
fn renders_elements_attributes_and_styles() {
    let node = h!(
        "form",
        Props::new()
            .class("login")
            .style("marginTop", "4px")
            .attr("novalidate", true)
            .attr("hidden", false)
            .attr("data-step", 2),
        h!("input", Props::new().attr("name", "user")),
        h!("br", Props::new()),
        "a < b"
    );

    assert_eq!(
        render_to_string(&node).unwrap(),
        "<form class=\"login\" style=\"margin-top:4px;\" novalidate data-step=\"2\"><input name=\"user\"><br>a &lt; b</form>"
    );
}

#[test]
fn components_render_with_initial_hook_values() {
    let node = h!(
        "main",
        Props::new(),
        Node::component(component!(greeting), Props::new().set("salutation", "Hi"))
    );

    assert_eq!(
        render_to_string(&node).unwrap(),
        "<main><p>Hi, stranger</p></main>"
    );
}

#[test]
fn html_payloads_are_written_as_is_or_sanitized() {
    let raw = h!("div", Props::new().raw_html("<i onclick=\"x\">i</i>"));
    let safe = h!("div", Props::new().safe_html("<i onclick=\"x\">i</i>"));

    assert_eq!(render_to_string(&raw).unwrap(), "<div><i onclick=\"x\">i</i></div>");
    assert_eq!(render_to_string(&safe).unwrap(), "<div><i>i</i></div>");
}

#[test]
fn boundaries_fall_back_and_errors_name_the_component() {
    let guarded = Node::fragment(vec![
        Node::boundary_with_fallback(
            Node::component(component!(broken), Props::new()),
            Node::text("offline"),
        ),
        Node::text("!"),
    ]);
    assert_eq!(render_to_string(&guarded).unwrap(), "offline!");

    let err = render_to_string(&Node::component(component!(broken), Props::new())).unwrap_err();
    assert_eq!(err.component(), Some("broken"));
    assert_eq!(err.to_string(), "component `broken` failed to render: no data");
}

#[test]
fn fragments_and_outlets_render_their_children() {
    let node = Node::fragment(vec![
        Node::text("a"),
        Node::outlet(Some(Node::text("b"))),
        Node::outlet(None),
    ]);

    assert_eq!(render_to_string(&node).unwrap(), "ab");
}
