use proptest::prelude::*;
use survey_core::extract::signature::{split_declaration, strip_attributes, strip_line_comment};
use survey_core::extract::{extract_signatures, ScanState, SignatureScanner};
use survey_core::model::SourceFile;
use survey_core::project::MarkerConfig;

fn scan(text: &str) -> Vec<(String, String, bool)> {
    let source = SourceFile::new("kernels/reduce.cu");
    extract_signatures(text, &source, &MarkerConfig::default())
        .expect("default markers are valid")
        .into_iter()
        .map(|sig| (sig.name, sig.parameters, sig.is_template))
        .collect()
}

#[test]
fn declaration_split_across_lines_is_joined() {
    let text = "// @kernel\n__global__ void foo(int a,\n                    float* b)\n{\n}\n";
    assert_eq!(scan(text), vec![("foo".to_string(), "int a, float* b".to_string(), false)]);
}

#[test]
fn second_tag_rearms_and_first_is_dropped() {
    let text = "// @kernel\n\n// @kernel\n__global__ void second(int n) {}\n";
    let sigs = scan(text);
    assert_eq!(sigs.len(), 1);
    assert_eq!(sigs[0].0, "second");
}

#[test]
fn file_without_tags_yields_nothing() {
    let text = "__global__ void untagged(int n) {}\nint main() { return 0; }\n";
    assert!(scan(text).is_empty());
}

#[test]
fn untagged_declarations_between_tagged_ones_are_ignored() {
    let text = "\
// @kernel
__global__ void first(int n) {}

__global__ void helper(int n) {}

// @kernel
__global__ void second(float x) {}
";
    let names: Vec<String> = scan(text).into_iter().map(|s| s.0).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn template_introducer_between_tag_and_declaration_sets_flag() {
    let text = "\
// @kernel
template <typename T>
__global__ void scale(T* data, T factor, int n)
{
}
// @kernel
__global__ void plain(int n) {}
";
    let sigs = scan(text);
    assert_eq!(sigs.len(), 2);
    assert_eq!(sigs[0], ("scale".to_string(), "T* data, T factor, int n".to_string(), true));
    assert!(!sigs[1].2, "template flag resets for each tag");
}

#[test]
fn template_on_declaration_line_sets_flag() {
    let text = "// @kernel\ntemplate <int N> __global__ void unrolled(float* x) {}\n";
    let sigs = scan(text);
    assert_eq!(sigs.len(), 1);
    assert!(sigs[0].2);
}

#[test]
fn launch_bounds_attribute_is_removed() {
    let text = "\
// @kernel
__global__ void __launch_bounds__(256, 2) reduce(const float* in, float* out) {}
";
    assert_eq!(
        scan(text),
        vec![("reduce".to_string(), "const float* in, float* out".to_string(), false)]
    );
}

#[test]
fn attribute_spanning_lines_keeps_capturing() {
    let text = "\
// @kernel
__global__ void __launch_bounds__(256,
                                  2)
reduce(int n,
       float* out)
{
}
";
    assert_eq!(scan(text), vec![("reduce".to_string(), "int n, float* out".to_string(), false)]);
}

#[test]
fn trailing_comments_are_stripped_before_capture() {
    let text = "\
// @kernel
__global__ void axpy(int n, // element count
                     float a, // scale (alpha)
                     float* y) // output
{
}
";
    assert_eq!(
        scan(text),
        vec![("axpy".to_string(), "int n, float a, float* y".to_string(), false)]
    );
}

#[test]
fn nested_parentheses_in_parameters_are_kept() {
    let text = "// @kernel\n__global__ void apply(void (*fn)(float), float* x) {}\n";
    assert_eq!(
        scan(text),
        vec![("apply".to_string(), "void (*fn)(float), float* x".to_string(), false)]
    );
}

#[test]
fn namespaced_names_are_accepted() {
    let text = "// @kernel\n__global__ void ops::detail::relu(float* x) {}\n";
    assert_eq!(scan(text)[0].0, "ops::detail::relu");
}

#[test]
fn unterminated_declaration_at_end_of_input_is_dropped() {
    let text = "// @kernel\n__global__ void broken(int a,\n    float b\n";
    assert!(scan(text).is_empty());
}

#[test]
fn unterminated_declaration_is_dropped_when_next_tag_arrives() {
    let text = "\
// @kernel
__global__ void broken(int a,
// @kernel
__global__ void ok(int b) {}
";
    let names: Vec<String> = scan(text).into_iter().map(|s| s.0).collect();
    assert_eq!(names, vec!["ok"]);
}

#[test]
fn declaration_without_name_is_dropped() {
    let text = "// @kernel\n__global__ (int a) {}\n";
    assert!(scan(text).is_empty());
}

#[test]
fn declaration_without_return_type_keeps_trailing_identifier() {
    let text = "// @kernel\n__global__ foo(int a) {}\n";
    assert_eq!(scan(text), vec![("foo".to_string(), "int a".to_string(), false)]);
}

#[test]
fn custom_markers_are_honoured() {
    let markers = MarkerConfig {
        tag: "#[bench]".to_string(),
        declaration_keyword: "kernel".to_string(),
        line_comment: "#".to_string(),
        ..MarkerConfig::default()
    };
    let source = SourceFile::new("ops.cl");
    let text = "# #[bench]\nkernel void vadd(global float* a, global float* b) {}\n";
    let sigs = extract_signatures(text, &source, &markers).expect("valid markers");
    assert_eq!(sigs.len(), 1);
    assert_eq!(sigs[0].name, "vadd");
    assert_eq!(sigs[0].source.name, "ops.cl");
}

#[test]
fn scanner_rejects_empty_tag() {
    let markers = MarkerConfig { tag: "  ".to_string(), ..MarkerConfig::default() };
    assert!(SignatureScanner::new(&markers).is_err());
}

#[test]
fn state_machine_transitions_in_isolation() {
    let markers = MarkerConfig::default();
    let scanner = SignatureScanner::new(&markers).expect("scanner");
    let source = SourceFile::new("a.cu");

    let armed = ScanState::Idle.on_tag(3, &source);
    assert_eq!(armed, ScanState::Armed { tag_line: 3, template: false });

    let (armed, done) = armed.on_code("template <typename T>", &scanner);
    assert!(done.is_none());
    assert_eq!(armed, ScanState::Armed { tag_line: 3, template: true });

    let (capturing, done) = armed.on_code("__global__ void k(T x,", &scanner);
    assert!(done.is_none());
    assert!(matches!(capturing, ScanState::Capturing { tag_line: 3, template: true, .. }));

    let (idle, done) = capturing.on_code("  int n)", &scanner);
    assert_eq!(idle, ScanState::Idle);
    let decl = done.expect("declaration completes");
    assert_eq!(decl.head, "__global__ void k");
    assert_eq!(decl.parameters, "T x, int n");

    let rearmed = ScanState::Capturing { tag_line: 1, template: true, buffer: "x(".into() }
        .on_tag(9, &source);
    assert_eq!(rearmed, ScanState::Armed { tag_line: 9, template: false });
}

#[test]
fn idle_state_ignores_code() {
    let scanner = SignatureScanner::new(&MarkerConfig::default()).expect("scanner");
    let (state, done) = ScanState::Idle.on_code("__global__ void k(int n)", &scanner);
    assert_eq!(state, ScanState::Idle);
    assert!(done.is_none());
}

#[test]
fn helpers_handle_comments_and_attributes() {
    assert_eq!(strip_line_comment("int a, // note", "//"), "int a, ");
    assert_eq!(strip_line_comment("no comment", ""), "no comment");

    let keywords = vec!["__launch_bounds__".to_string()];
    assert_eq!(strip_attributes("void __launch_bounds__(1", &keywords), None);
    let stripped = strip_attributes("void my__launch_bounds__(1) k(", &keywords).expect("balanced");
    assert!(stripped.contains("my__launch_bounds__(1)"), "only whole-word attributes are removed");

    assert_eq!(
        split_declaration("__global__   void  k( int  a ,float b )", &keywords),
        Some(("__global__ void k".to_string(), "int a ,float b".to_string()))
    );
    assert_eq!(split_declaration("__global__ void k(int a,", &keywords), None);
}

proptest! {
    #[test]
    fn n_well_formed_declarations_yield_n_records_in_order(
        names in prop::collection::vec("[a-z][a-z0-9]{0,8}", 1..8),
        split in any::<bool>(),
    ) {
        let mut text = String::from("#include <cuda.h>\n\n");
        let mut expected = Vec::new();
        for (idx, name) in names.iter().enumerate() {
            let name = format!("{name}_{idx}");
            text.push_str("// @kernel\n");
            if split {
                text.push_str(&format!("__global__ void {name}(int a,\n    float* b)\n{{\n}}\n\n"));
            } else {
                text.push_str(&format!("__global__ void {name}(int a, float* b) {{}}\n\n"));
            }
            expected.push(name);
        }

        let source = SourceFile::new("gen.cu");
        let sigs = extract_signatures(&text, &source, &MarkerConfig::default()).unwrap();
        let got: Vec<String> = sigs.iter().map(|s| s.name.clone()).collect();
        prop_assert_eq!(got, expected);
        prop_assert!(sigs.iter().all(|s| s.parameters == "int a, float* b"));
    }
}
