//! Prompt construction for the lab-analysis report request.

/// Builds the analysis prompt for one video URL.
///
/// The prompt pins down the output schema (key order, category vocabulary,
/// sub-test shape) so that extraction stays mechanical. Tolerance for the
/// model ignoring parts of it lives in [`crate::extract`], not here.
pub(crate) fn build_report_prompt(video_url: &str) -> String {
    format!(
        "\
You are a JSON generator for laboratory analysis reports. Always output valid \
JSON only, no conversational text or markdown.

Task: Analyze the YouTube video at: {video_url} and generate a laboratory \
analysis report for every product tested in it.

Output Format: You MUST return a valid JSON object (or a JSON array of objects \
if multiple products are found). The schema MUST follow this exact key order \
and structure:

product_id: (COMPANY + NAME + FLAVOR) in ALL CAPS, no spaces.
product_info: {{product_name, product_category, serving_size, verdict}}
basic_tests: {{result, ...sub-tests}}
contaminant_tests: {{result, ...sub-tests}}
review: {{result, ...details}}

Strict Logic Rules:

Categories: Only use: Whey Concentrate, Whey Isolate, Whey Blend, Plant \
protein, Creatine, Food, Omega 3, Others.
Calculation: If the video only provides percentages for Protein/Creatine, you \
MUST calculate the per_serving value based on the serving_size.
No Ranges: Use single values only. If a range is given, provide the average.
Sub-test Structure: Every nutrient/test (protein, carbs, etc.) MUST contain \
three keys: \"result\" (Pass/Fail), \"claimed\", and \"tested\".
Ordering: The JSON keys MUST appear in the exact order: product_id -> \
product_info -> basic_tests -> contaminant_tests -> review.

Example:
{{
  \"product_id\": \"BRANDNAMEPRODUCTNAMEFLAVOR\",
  \"product_info\": {{
    \"product_name\": \"Example Protein\",
    \"product_category\": \"Whey Concentrate\",
    \"serving_size\": \"1 Scoop (30g)\",
    \"verdict\": \"Pass\"
  }},
  \"basic_tests\": {{
    \"result\": \"Pass\",
    \"protein\": {{ \"result\": \"Pass\", \"claimed\": \"24g\", \"tested\": \"24.5g\" }}
  }},
  \"contaminant_tests\": {{
    \"result\": \"Pass\",
    \"heavy_metals\": {{ \"result\": \"Pass\", \"status\": \"Below LOQ\" }}
  }},
  \"review\": {{
    \"result\": \"Pass\",
    \"taste\": {{ \"result\": \"Pass\", \"description\": \"Good\" }}
  }}
}}
"
    )
}
