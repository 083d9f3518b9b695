//! C++ profile: type-mapped declarations, `cout` echoes, `assert` checks,
//! explicit teardown for heap-built structures.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::codec::Literal;
use crate::error::Error;
use crate::meta::{BaseType, MethodMeta, Param, SemanticType};
use crate::parser::{self, ParsedCase};

use super::{base_name, case_var, comparable_expected, Emitter};

static METHOD_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*\([^)]*\)\s*\{").unwrap());
static METHOD_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*\([^)]*\)").unwrap());
static SOLUTION_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)class\s+Solution\s*\{.*?\};").unwrap());
static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+[\w<>:]+\**\s+(\w+)\s*=\s*(\{.*\});$").unwrap());
static CASE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"// Test case (\d+)").unwrap());

const SUMMARY: &str = "\n    cout << \"All test cases passed\" << endl;";

pub struct CppEmitter;

impl Emitter for CppEmitter {
    fn profile(&self) -> &'static str {
        "cpp"
    }

    /// Definition shape first (`name(args) {`), then a bare declaration.
    fn extract_method_name(&self, snippet: &str) -> String {
        if let Some(caps) = METHOD_DEF.captures(snippet) {
            return caps[1].to_string();
        }
        if let Some(caps) = METHOD_DECL.captures(snippet) {
            return caps[1].to_string();
        }
        "solution".to_string()
    }

    fn replace_solution_class(&self, template: &str, snippet: &str) -> String {
        if !(template.contains("class Solution") && snippet.contains("class Solution")) {
            return template.to_string();
        }
        if !SOLUTION_CLASS.is_match(template) {
            return template.to_string();
        }
        // Class definitions end with exactly one trailing semicolon.
        let mut body = snippet.trim_end().trim_end_matches(';').trim_end().to_string();
        body.push(';');
        SOLUTION_CLASS.replace(template, NoExpand(&body)).into_owned()
    }

    fn generate_test_statements(
        &self,
        cases: &[ParsedCase],
        meta: &MethodMeta,
        method_name: &str,
    ) -> Vec<String> {
        if cases.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for case in cases {
            let k = case.index + 1;
            out.push(format!("\n    // Test case {k}"));

            let mut args = Vec::new();
            for binding in &case.params {
                let var = case_var(&binding.param.name, case.index);
                let cpp_ty = cpp_type(&binding.param.ty);
                let value = render_value(&binding.value, &binding.param.ty);
                out.push(format!("    {cpp_ty} {var} = {value};"));
                args.push(var);
            }
            let args = args.join(", ");

            let ret = meta.ret.value();
            if ret.is_none() {
                out.push(format!("    sol.{method_name}({args});"));
            } else {
                out.push(format!("    auto result_{k} = sol.{method_name}({args});"));
            }
            out.push(format!("    cout << \"Test case {k}:\" << endl;"));
            for binding in &case.params {
                let var = case_var(&binding.param.name, case.index);
                let shown = echo_expr(&var, &binding.param.ty);
                out.push(format!(
                    "    cout << \"input: {}=\" << {shown} << endl;",
                    binding.param.name
                ));
            }

            let Some(ret_ty) = ret else {
                out.push("    cout << \"output: void, no return value\" << endl << endl;".into());
                continue;
            };

            match case.expected.as_deref() {
                Some(expected) => out.push(format!("    // expected: {expected}")),
                None => out.push("    // expected: none".into()),
            }
            let rendered = string_of(&format!("result_{k}"), ret_ty);
            out.push(format!("    cout << \"output: \" << {rendered} << endl;"));

            if let Some(expected) = case.expected.as_deref() {
                let expected = comparable_expected(expected);
                out.push(format!("    cout << \"expected: {expected}\" << endl;"));
                out.push(format!("    assert({rendered} == \"{expected}\");"));
                out.push("    cout << \"PASS\" << endl << endl;".into());
            } else {
                out.push(
                    "    cout << \"no expected value, verify the output by hand\" << endl << endl;"
                        .into(),
                );
            }
        }
        out.push(SUMMARY.to_string());
        out
    }

    fn create_test_code(
        &self,
        raw: &str,
        meta: &MethodMeta,
        snippet: &str,
        narrative: Option<&str>,
    ) -> Result<String, Error> {
        if !meta.has_params() {
            tracing::debug!(profile = "cpp", "descriptor has no parameters, emitting nothing");
            return Ok(String::new());
        }
        let method_name = self.extract_method_name(snippet);
        let cases = parser::parse(raw, meta, narrative);
        if cases.is_empty() {
            tracing::debug!(profile = "cpp", "no cases parsed, emitting skeleton harness");
            return Ok(assemble(Vec::new(), Vec::new(), skeleton_body()));
        }

        let mut statements = self.generate_test_statements(&cases, meta, &method_name);
        if meta.params.iter().any(is_heap_built) {
            statements = rewrite_recursive(statements, &meta.params)?;
        }
        Ok(assemble(
            additional_includes(meta),
            helper_functions(&meta.params),
            statements,
        ))
    }
}

fn assemble(includes: Vec<String>, helpers: Vec<String>, statements: Vec<String>) -> String {
    let mut text = Vec::new();
    text.extend(includes);
    text.extend(helpers);
    text.push("\n// Test harness".into());
    text.push("void test_solution()".into());
    text.push("{".into());
    text.push("    Solution sol;".into());
    text.extend(statements);
    text.push("}".into());
    text.push("\n// Entry point".into());
    text.push("int main()".into());
    text.push("{".into());
    text.push("    test_solution();".into());
    text.push("    return 0;".into());
    text.push("}".into());
    text.join("\n")
}

fn skeleton_body() -> Vec<String> {
    vec!["    // add cases here".into(), SUMMARY.to_string()]
}

// ------------------------------ Type map ----------------------------------- //

fn cpp_type(ty: &SemanticType) -> String {
    let base = match ty.base {
        BaseType::Integer => "int",
        BaseType::Long => "long long",
        BaseType::Double => "double",
        BaseType::Float => "float",
        BaseType::Boolean => "bool",
        BaseType::Character => "char",
        BaseType::String => "string",
        BaseType::ListNode if ty.dims == 0 => return "ListNode*".into(),
        BaseType::TreeNode if ty.dims == 0 => return "TreeNode*".into(),
        BaseType::ListNode | BaseType::TreeNode => return "auto".into(),
    };
    match ty.dims {
        0 => base.to_string(),
        1 => format!("vector<{base}>"),
        _ => format!("vector<vector<{base}>>"),
    }
}

/// Canonical literal → C++ initializer text.
///
/// Recursive parameters get their flat/level-order array as a brace
/// literal; the rewrite pass turns that into a two-step construction.
fn render_value(lit: &Literal, ty: &SemanticType) -> String {
    if lit.is_null() {
        return if ty.is_array() {
            "{}".into()
        } else if ty.base.is_recursive() {
            "nullptr".into()
        } else {
            "0".into()
        };
    }
    if ty.is_array() || ty.base.is_recursive() {
        return render_braced(lit);
    }
    match lit {
        Literal::Str(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

fn render_braced(lit: &Literal) -> String {
    match lit {
        Literal::Array(items) => {
            let inner: Vec<String> = items.iter().map(render_braced).collect();
            format!("{{{}}}", inner.join(", "))
        }
        // Absent tree children carry the INT_MIN sentinel in emitted code.
        Literal::Null => "INT_MIN".into(),
        Literal::Str(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

/// Expression printing a parameter in its canonical textual form.
fn echo_expr(var: &str, ty: &SemanticType) -> String {
    if ty.is_array() {
        return format!("to_string({var})");
    }
    match ty.base {
        BaseType::ListNode => format!("linkedListToString({var})"),
        BaseType::TreeNode => format!("binaryTreeToString({var})"),
        _ => var.to_string(),
    }
}

/// Expression rendering a result as a `string`, for output and comparison.
fn string_of(var: &str, ty: &SemanticType) -> String {
    if ty.is_array() {
        return format!("to_string({var})");
    }
    match ty.base {
        BaseType::ListNode => format!("linkedListToString({var})"),
        BaseType::TreeNode => format!("binaryTreeToString({var})"),
        BaseType::String => var.to_string(),
        BaseType::Boolean => format!("string({var} ? \"true\" : \"false\")"),
        BaseType::Character => format!("string(1, {var})"),
        _ => format!("to_string({var})"),
    }
}

// ----------------------------- Rewrite pass -------------------------------- //

fn is_heap_built(param: &Param) -> bool {
    param.ty.base.is_recursive() && !param.ty.is_array()
}

/// Replace each recursive-parameter brace declaration with a two-step
/// construction, and free every built structure before the closing summary.
fn rewrite_recursive(statements: Vec<String>, params: &[Param]) -> Result<Vec<String>, Error> {
    let heap_built: Vec<&Param> = params.iter().filter(|p| is_heap_built(p)).collect();
    let mut out = Vec::new();
    let mut teardown: Vec<(String, BaseType)> = Vec::new();
    let mut case_idx = 0usize;

    for line in statements {
        if let Some(caps) = CASE_HEADER.captures(&line) {
            case_idx = caps[1].parse::<usize>().unwrap_or(1).saturating_sub(1);
        }
        let Some(caps) = DECLARATION.captures(&line) else {
            out.push(line);
            continue;
        };
        let var = caps[1].to_string();
        let value = caps[2].to_string();
        let Some(param) = heap_built.iter().find(|p| p.name == base_name(&var)) else {
            out.push(line);
            continue;
        };
        match param.ty.base {
            BaseType::ListNode => {
                out.push(format!("    vector<int> {var}_values = {value};"));
                out.push(format!("    ListNode* {var} = createLinkedList({var}_values);"));
            }
            BaseType::TreeNode => {
                out.push(format!("    vector<int> {var}_values = {value};"));
                out.push(format!("    TreeNode* {var} = createBinaryTree({var}_values);"));
            }
            _ => {
                return Err(Error::Codegen {
                    profile: "cpp",
                    case_idx,
                    message: format!("parameter '{}' is not a heap-built structure", param.name),
                });
            }
        }
        teardown.push((var, param.ty.base));
    }

    let Some(summary_at) = out.iter().rposition(|l| l.as_str() == SUMMARY) else {
        return Err(Error::Codegen {
            profile: "cpp",
            case_idx,
            message: "closing summary statement not found".into(),
        });
    };
    if !teardown.is_empty() {
        let mut cleanup = vec!["\n    // Release heap-built structures".to_string()];
        for (var, base) in &teardown {
            match base {
                BaseType::ListNode => cleanup.push(format!("    freeLinkedList({var});")),
                _ => cleanup.push(format!("    freeBinaryTree({var});")),
            }
        }
        out.splice(summary_at..summary_at, cleanup);
    }
    Ok(out)
}

// ------------------------- Includes and helpers ---------------------------- //

fn additional_includes(meta: &MethodMeta) -> Vec<String> {
    let types: Vec<&SemanticType> = meta
        .params
        .iter()
        .map(|p| &p.ty)
        .chain(meta.ret.value())
        .collect();
    let any_array = types.iter().any(|t| t.is_array());
    let any_recursive = types.iter().any(|t| t.base.is_recursive());

    let mut headers: IndexSet<&'static str> = IndexSet::new();
    if any_array || any_recursive {
        headers.insert("#include <vector>");
    }
    if any_array || any_recursive || types.iter().any(|t| t.base == BaseType::String) {
        headers.insert("#include <string>");
    }
    if types.iter().any(|t| t.base == BaseType::TreeNode) {
        headers.insert("#include <queue>");
        headers.insert("#include <climits>");
    }
    headers.insert("#include <cassert>");

    let mut out: Vec<String> = headers.into_iter().map(str::to_string).collect();
    if any_array {
        out.extend(
            [
                "",
                "// Render a vector as [a,b,c].",
                "template<typename T>",
                "string to_string(const vector<T>& v) {",
                "    string result = \"[\";",
                "    for (size_t i = 0; i < v.size(); ++i) {",
                "        if (i > 0) result += \",\";",
                "        result += to_string(v[i]);",
                "    }",
                "    result += \"]\";",
                "    return result;",
                "}",
                "",
            ]
            .map(str::to_string),
        );
    }
    out
}

fn helper_functions(params: &[Param]) -> Vec<String> {
    let mut out = Vec::new();
    if params.iter().any(|p| p.ty.base == BaseType::ListNode) {
        out.extend(
            [
                "\n// Singly-linked list node.",
                "struct ListNode {",
                "    int val;",
                "    ListNode *next;",
                "    ListNode() : val(0), next(nullptr) {}",
                "    ListNode(int x) : val(x), next(nullptr) {}",
                "    ListNode(int x, ListNode *next) : val(x), next(next) {}",
                "};",
                "",
                "// Build a linked list from its flat value array.",
                "ListNode* createLinkedList(const vector<int>& values) {",
                "    if (values.empty()) {",
                "        return nullptr;",
                "    }",
                "    ListNode* head = new ListNode(values[0]);",
                "    ListNode* current = head;",
                "    for (size_t i = 1; i < values.size(); ++i) {",
                "        current->next = new ListNode(values[i]);",
                "        current = current->next;",
                "    }",
                "    return head;",
                "}",
                "",
                "// Render a linked list as [a,b,c].",
                "string linkedListToString(ListNode* head) {",
                "    if (!head) {",
                "        return \"[]\";",
                "    }",
                "    string result = \"[\";",
                "    while (head) {",
                "        result += to_string(head->val);",
                "        if (head->next) result += \",\";",
                "        head = head->next;",
                "    }",
                "    result += \"]\";",
                "    return result;",
                "}",
                "",
                "// Release every node of a linked list.",
                "void freeLinkedList(ListNode* head) {",
                "    while (head) {",
                "        ListNode* temp = head;",
                "        head = head->next;",
                "        delete temp;",
                "    }",
                "}",
                "",
            ]
            .map(str::to_string),
        );
    }
    if params.iter().any(|p| p.ty.base == BaseType::TreeNode) {
        out.extend(
            [
                "\n// Binary tree node.",
                "struct TreeNode {",
                "    int val;",
                "    TreeNode *left;",
                "    TreeNode *right;",
                "    TreeNode() : val(0), left(nullptr), right(nullptr) {}",
                "    TreeNode(int x) : val(x), left(nullptr), right(nullptr) {}",
                "    TreeNode(int x, TreeNode *left, TreeNode *right) : val(x), left(left), right(right) {}",
                "};",
                "",
                "// Build a binary tree from its level-order array; INT_MIN marks an absent child.",
                "TreeNode* createBinaryTree(const vector<int>& values) {",
                "    if (values.empty() || values[0] == INT_MIN) {",
                "        return nullptr;",
                "    }",
                "    TreeNode* root = new TreeNode(values[0]);",
                "    queue<TreeNode*> q;",
                "    q.push(root);",
                "    size_t i = 1;",
                "    while (!q.empty() && i < values.size()) {",
                "        TreeNode* node = q.front();",
                "        q.pop();",
                "        if (i < values.size() && values[i] != INT_MIN) {",
                "            node->left = new TreeNode(values[i]);",
                "            q.push(node->left);",
                "        }",
                "        i++;",
                "        if (i < values.size() && values[i] != INT_MIN) {",
                "            node->right = new TreeNode(values[i]);",
                "            q.push(node->right);",
                "        }",
                "        i++;",
                "    }",
                "    return root;",
                "}",
                "",
                "// Render a binary tree as its level-order array, trailing nulls stripped.",
                "string binaryTreeToString(TreeNode* root) {",
                "    if (!root) {",
                "        return \"[]\";",
                "    }",
                "    vector<string> nodes;",
                "    queue<TreeNode*> q;",
                "    q.push(root);",
                "    while (!q.empty()) {",
                "        TreeNode* node = q.front();",
                "        q.pop();",
                "        if (node) {",
                "            nodes.push_back(to_string(node->val));",
                "            q.push(node->left);",
                "            q.push(node->right);",
                "        } else {",
                "            nodes.push_back(\"null\");",
                "        }",
                "    }",
                "    while (nodes.back() == \"null\") {",
                "        nodes.pop_back();",
                "    }",
                "    string result = \"[\";",
                "    for (size_t i = 0; i < nodes.size(); ++i) {",
                "        if (i > 0) {",
                "            result += \",\";",
                "        }",
                "        result += nodes[i];",
                "    }",
                "    result += \"]\";",
                "    return result;",
                "}",
                "",
                "// Release every node of a binary tree.",
                "void freeBinaryTree(TreeNode* root) {",
                "    if (!root) {",
                "        return;",
                "    }",
                "    freeBinaryTree(root->left);",
                "    freeBinaryTree(root->right);",
                "    delete root;",
                "}",
                "",
            ]
            .map(str::to_string),
        );
    }
    out
}

// -------------------------------- Tests ----------------------------------- //
