use hcx_files::DocumentKind;

const TEMPLATE: &str = r#"You are a FHIR R4 expert working with the Health Claims Exchange (HCX) implementation guide used in India.

Convert the insurance plan information below into FHIR R4 InsurancePlan resources.

Rules:
- Respond with JSON only. No explanations, no Markdown outside a single ```json block.
- Return a Bundle with "resourceType": "Bundle" and "type": "collection". Each entry has a "fullUrl" of the form "urn:uuid:<uuid>" and a "resource" that is an InsurancePlan.
- Create one InsurancePlan per distinct plan found in the source.
- Populate "status" (use "active" unless the source says otherwise), "name", "type", "period", "ownedBy" and "identifier" when the source provides them.
- Map benefits and coverage limits to "coverage[].benefit[]" with "limit[].value" as a Quantity, and premiums or cost sharing to "plan[].generalCost[]" / "plan[].specificCost[]".
- Amounts are in INR unless the source names another currency.
- Keep codes as CodeableConcept with "text" when no standard code applies.
- Do not invent values that are not present in the source.
- If a plan cannot be converted, return an object {"error": "<reason>"} in its place. If nothing can be converted, return a JSON array of such error objects.

Source document type: {{kind}}

Source content:
{{content}}
"#;

/// Builds the conversion prompt for extracted document text.
pub fn build_prompt(kind: DocumentKind, content: &str) -> String {
    let kind = match kind {
        DocumentKind::Pdf => "PDF (raw extracted text)",
        DocumentKind::Excel => "Excel workbook (sheet summaries with sample rows)",
    };
    TEMPLATE
        .replace("{{kind}}", kind)
        .replace("{{content}}", content)
}
