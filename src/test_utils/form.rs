use scraper::{ElementRef, Html, Selector};

/// Get the first form that contains an input or button named `field_name`.
#[track_caller]
pub(crate) fn must_get_form_with_field<'a>(html: &'a Html, field_name: &str) -> ElementRef<'a> {
    let field_selector = Selector::parse(&format!(
        "input[name=\"{field_name}\"], button[name=\"{field_name}\"]"
    ))
    .unwrap();

    html.select(&Selector::parse("form").unwrap())
        .find(|form| form.select(&field_selector).next().is_some())
        .unwrap_or_else(|| panic!("No form found with a field named \"{field_name}\""))
}

#[track_caller]
pub(crate) fn assert_form_action(form: &ElementRef<'_>, method: &str, action: &str) {
    let got_method = form.value().attr("method").unwrap_or_default();
    let got_action = form.value().attr("action").unwrap_or_default();

    assert_eq!(
        got_method, method,
        "want form with method=\"{method}\", got {got_method:?}"
    );
    assert_eq!(
        got_action, action,
        "want form with action=\"{action}\", got {got_action:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            let input_required = input.value().attr("required");

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );

            assert!(
                input_required.is_some(),
                "want input with name {name} to have the required attribute but got none"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
    let got_text = submit_button.text().collect::<Vec<_>>().join("");
    let got_text = got_text.trim();
    assert_eq!(text, got_text);
}
