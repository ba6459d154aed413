use std::collections::HashSet;

use form_autofill::{
    dom::document::Document,
    form::{
        discovery::{discover, discover_fields},
        field_model::FieldKind,
        label::UNKNOWN_FIELD,
    },
};

mod common;

use crate::common::utils::{field, fixture_doc};

// ============================================================================
// Container-scoped discovery
// ============================================================================

#[test]
fn survey_fields_in_document_order() {
    let fields = discover_fields(&fixture_doc("survey.html"));

    let summary: Vec<(&str, FieldKind, &str)> = fields
        .iter()
        .map(|f| (f.identifier.as_str(), f.kind, f.label.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("q0_text0", FieldKind::SingleLineText, "Full name"),
            ("q1_radio0", FieldKind::SingleChoice, "Favorite color"),
            ("q2_checkbox0", FieldKind::MultiChoice, "Toppings - Cheese"),
            ("q2_checkbox1", FieldKind::MultiChoice, "Toppings - Olives"),
            ("q3_select0", FieldKind::ChoiceList, "Country"),
            ("q4_textarea0", FieldKind::MultiLineText, "Comments"),
            ("extra_text0", FieldKind::SingleLineText, "Newsletter email"),
        ]
    );
}

#[test]
fn radios_collapse_into_one_choice_field() {
    let fields = discover_fields(&fixture_doc("survey.html"));
    let color = field(&fields, "Favorite color");

    assert_eq!(color.options, vec!["Red", "Green", "Blue"]);
    assert_eq!(
        fields.iter().filter(|f| f.kind == FieldKind::SingleChoice).count(),
        1
    );
}

#[test]
fn checkboxes_stay_individual_without_options() {
    let fields = discover_fields(&fixture_doc("survey.html"));
    let boxes: Vec<_> = fields
        .iter()
        .filter(|f| f.kind == FieldKind::MultiChoice)
        .collect();

    assert_eq!(boxes.len(), 2);
    assert!(boxes.iter().all(|f| f.options.is_empty()));
}

#[test]
fn select_options_and_required_flags() {
    let fields = discover_fields(&fixture_doc("survey.html"));

    assert_eq!(
        field(&fields, "Country").options,
        vec!["Choose...", "Canada", "Mexico"]
    );
    assert!(field(&fields, "Full name").required);
    assert!(!field(&fields, "Comments").required);
}

#[test]
fn every_control_claimed_at_most_once() {
    let doc = fixture_doc("survey.html");
    let discovery = discover(&doc);

    assert!(!discovery.flat);
    assert_eq!(discovery.claimed.len(), 8);
    assert_eq!(discovery.swept.len(), 1);
    assert!(discovery.claimed.is_disjoint(&discovery.swept));

    let ids: HashSet<&str> = discovery
        .fields
        .iter()
        .map(|f| f.identifier.as_str())
        .collect();
    assert_eq!(ids.len(), discovery.fields.len());
}

#[test]
fn nested_containers_do_not_double_count() {
    let doc = Document::parse_html(
        r#"<div class="question" data-question-id="1">
             <div class="form-group">
               <h3>Nickname</h3>
               <input type="text" name="nick">
             </div>
           </div>"#,
    );
    let fields = discover_fields(&doc);

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].label, "Nickname");
    assert_eq!(fields[0].identifier, "q0_text0");
}

#[test]
fn outer_container_keeps_controls_its_inner_container_does_not_hold() {
    let doc = Document::parse_html(
        r#"<fieldset><legend>Contact</legend>
             <div class="form-group"><label for="e">Email</label><input id="e" type="email"></div>
             <label><input type="checkbox" name="sub"> Subscribe</label>
             <select name="freq"><option>Daily</option><option>Weekly</option></select>
           </fieldset>"#,
    );
    let discovery = discover(&doc);
    let summary: Vec<(&str, FieldKind, &str)> = discovery
        .fields
        .iter()
        .map(|f| (f.identifier.as_str(), f.kind, f.label.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("q0_checkbox0", FieldKind::MultiChoice, "Contact - Subscribe"),
            ("q0_select0", FieldKind::ChoiceList, "Contact"),
            ("q1_text0", FieldKind::SingleLineText, "Email"),
        ]
    );
    assert_eq!(discovery.claimed.len(), 3);
    assert!(discovery.swept.is_empty());
}

#[test]
fn nested_radio_group_takes_the_question_heading() {
    let doc = Document::parse_html(
        r#"<div class="question"><h3>Favorite color</h3>
             <div role="radiogroup">
               <label><input type="radio" name="c" value="r"> Red</label>
               <label><input type="radio" name="c" value="g"> Green</label>
               <label><input type="radio" name="c" value="b"> Blue</label>
             </div>
           </div>"#,
    );
    let fields = discover_fields(&doc);

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].identifier, "q0_radio0");
    assert_eq!(fields[0].label, "Favorite color");
    assert_eq!(fields[0].options, vec!["Red", "Green", "Blue"]);
}

#[test]
fn sibling_question_headings_do_not_leak() {
    let doc = Document::parse_html(
        r#"<div class="question">
             <div role="group"><h4>Size</h4>
               <label><input type="radio" name="s" value="s"> Small</label>
             </div>
             <div role="group">
               <label><input type="radio" name="f" value="slim"> Slim</label>
             </div>
           </div>"#,
    );
    let fields = discover_fields(&doc);

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].label, "Size");
    assert_eq!(fields[1].label, "Slim");
}

#[test]
fn sweep_picks_up_text_controls_outside_containers() {
    let doc = Document::parse_html(
        r#"<fieldset><legend>Plan</legend>
             <label><input type="radio" name="plan" value="a"> A</label>
           </fieldset>
           <div><label for="promo">Promo code</label><input id="promo" type="text"></div>
           <div><textarea aria-label="Notes"></textarea></div>
           <div><input type="checkbox" name="stray"></div>"#,
    );
    let fields = discover_fields(&doc);
    let ids: Vec<&str> = fields.iter().map(|f| f.identifier.as_str()).collect();

    // The stray checkbox is outside every container and not a text control.
    assert_eq!(ids, vec!["q0_radio0", "extra_text0", "extra_textarea0"]);
    assert_eq!(fields[1].label, "Promo code");
    assert_eq!(fields[2].label, "Notes");
}

#[test]
fn aria_required_and_any_required_radio() {
    let doc = Document::parse_html(
        r#"<fieldset><legend>Tier</legend>
             <label><input type="radio" name="t" value="1"> One</label>
             <label><input type="radio" name="t" value="2" required> Two</label>
           </fieldset>
           <div class="question"><h3>Why</h3><textarea aria-required="true"></textarea></div>"#,
    );
    let fields = discover_fields(&doc);

    assert!(field(&fields, "Tier").required);
    assert!(field(&fields, "Why").required);
}

// ============================================================================
// Flat mode
// ============================================================================

#[test]
fn flat_document_is_one_implicit_container() {
    let doc = fixture_doc("flat.html");
    let discovery = discover(&doc);
    let fields = &discovery.fields;

    assert!(discovery.flat);
    assert!(discovery.swept.is_empty());

    let ids: Vec<&str> = fields.iter().map(|f| f.identifier.as_str()).collect();
    assert_eq!(
        ids,
        vec!["q0_text0", "q0_text1", "q0_radio0", "q0_checkbox0", "q0_text2"]
    );

    assert_eq!(fields[0].label, "Email");
    assert_eq!(fields[1].label, "City");
    assert_eq!(fields[2].options, vec!["Small", "Large"]);
    assert_eq!(fields[3].label, "I agree to the terms");
    assert_eq!(fields[4].label, UNKNOWN_FIELD);
}

#[test]
fn flat_mode_groups_radios_by_name() {
    let doc = Document::parse_html(
        r#"<form>
             <label><input type="radio" name="size" value="s"> Small</label>
             <label><input type="radio" name="fit" value="slim"> Slim</label>
             <label><input type="radio" name="size" value="l"> Large</label>
             <label><input type="radio" name="fit" value="loose"> Loose</label>
           </form>"#,
    );
    let fields = discover_fields(&doc);

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].options, vec!["Small", "Large"]);
    assert_eq!(fields[1].options, vec!["Slim", "Loose"]);
}

#[test]
fn disabled_and_hidden_inputs_are_not_fields() {
    let fields = discover_fields(&fixture_doc("flat.html"));
    assert_eq!(fields.len(), 5);
    assert!(fields.iter().all(|f| f.label != "locked"));
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn page_without_controls_yields_nothing() {
    assert!(discover_fields(&fixture_doc("empty.html")).is_empty());
    assert!(discover_fields(&Document::parse_html("")).is_empty());
}

#[test]
fn discovery_is_deterministic() {
    let doc = fixture_doc("survey.html");
    assert_eq!(discover_fields(&doc), discover_fields(&doc));
}

#[test]
fn descriptors_serialize_without_empty_options() {
    let fields = discover_fields(&fixture_doc("survey.html"));
    let json = serde_json::to_value(&fields[0]).unwrap();

    assert_eq!(json["kind"], "single-line-text");
    assert_eq!(json["identifier"], "q0_text0");
    assert!(json.get("options").is_none());
}
