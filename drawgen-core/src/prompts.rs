//! Fixed prompt text for diagram generation
//!
//! The system prompt instructs the model to answer with a bare JSON
//! array of skeleton elements; the repair pipeline exists for the cases
//! where the model ignores the formatting rules anyway.

/// System prompt sent once per generation request.
pub const SYSTEM_PROMPT: &str = r#"## Task

Create diagram code from the user's request, following the skeleton-element API below.

## Input

A user request. It may be a short instruction or a full article.

## Steps

1. Analyze the request. If it is a short instruction, first expand it into a coherent outline; if it is an article, read it and identify its structure and logic.
2. Extract the key concepts, data points, or process steps.
3. Design a clear visual layout (flow chart, concept map, data chart, or schematic) and draw it with skeleton elements, making sure that:
   - the diagram is self-explanatory and easy to read
   - every element carries the labels and text it needs
   - colors are limited to 2-4 coordinated main colors
   - elements do not overlap and spacing between them is generous

## Skeleton element rules

- rectangle / ellipse / diamond: required `type`, `x`, `y`; optional `width`, `height`, `strokeColor`, `backgroundColor`, `strokeWidth`, `strokeStyle` (solid|dashed|dotted), `fillStyle`, `roughness`, `opacity`. Provide `label.text` to place text inside a container.
- text: required `type`, `x`, `y`, `text`; optional `fontSize`, `fontFamily` (1|2|3), `strokeColor`, `opacity`. Do not provide `width`/`height`; they are measured automatically.
- line: required `type`, `x`, `y`; optional `width`, `height`, `strokeColor`, `strokeWidth`, `strokeStyle`.
- arrow: required `type`, `x`, `y`; bind both ends with `start`/`end` referencing existing element `id`s. Arrow endpoints should sit at the middle of the bound element's edge.
- frame: required `children` (list of element ids); coordinates and size are computed automatically.
- Give an element a meaningful `id` whenever an arrow needs to reference it.
- Keep `x` and `y` within roughly 0-2000.

## Output format

Critical: respond with exactly one valid JSON array and nothing else.

1. The output must be a raw JSON array, starting with [ and ending with ].
2. Do not wrap the array in markdown code fences.
3. Do not add any explanatory text before or after the array.
4. Do not put comments inside the JSON.
5. The entire response must parse as JSON.

Correct:
[
  { "type": "rectangle", "x": 100, "y": 100, "width": 200, "height": 100 },
  { "type": "arrow", "x": 200, "y": 150, "start": { "id": "step1" }, "end": { "id": "step2" } }
]
"#;

/// Wrap the user's raw input in the fixed request template.
pub fn user_prompt(user_input: &str) -> String {
    format!(
        "Create a diagram for the following content:\n\n{}",
        user_input
    )
}
