//! FHIR bundle templates for the HCX workflows.
//!
//! Requests are filled from the API forms; responses are derived from the request bundle
//! they answer. Anything a form does not carry is fixed sample data.

use api_shared::{ClaimForm, CommunicationForm, EligibilityForm, PatientDetails};
use fhir::{
    Bundle, Claim, ClaimInsurance, ClaimItem, ClaimResponse, ClaimResponseTotal, ClaimUse,
    CodeableConcept, Communication, CommunicationPayload, CommunicationStatus, Coverage,
    CoverageEligibilityRequest, CoverageEligibilityResponse, EligibilityInsurance,
    EligibilityPurpose, EligibilityResponseInsurance, FhirResult, FinancialStatus, HumanName,
    Identifier, Money, Organization, Outcome, Patient, Reference, Resource,
    ABHA_IDENTIFIER_SYSTEM,
};
use uuid::Uuid;

pub const PARTICIPANT_CODE_SYSTEM: &str = "https://hcxprotocol.io/participant-code";
pub const POLICY_NUMBER_SYSTEM: &str = "https://hcxprotocol.io/policy-number";
const CLAIM_TYPE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/claim-type";
const PRIORITY_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/processpriority";
const ADJUDICATION_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/adjudication";
const COMMUNICATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/communication-category";
const SERVICE_SYSTEM: &str = "https://hcxprotocol.io/codes/service";

/// Participant codes of both sides of an exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parties {
    pub provider_code: String,
    pub payer_code: String,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn reference_to<R: Resource>(id: &str) -> Reference {
    Reference::to(R::RESOURCE_TYPE, id)
}

/// Id part of a `Type/id` reference.
fn reference_id(reference: &Reference) -> Option<&str> {
    reference
        .reference
        .as_deref()
        .and_then(|r| r.rsplit('/').next())
}

fn patient(details: &PatientDetails) -> Patient {
    Patient {
        id: Some(new_id()),
        meta: None,
        identifier: details
            .abha_id
            .iter()
            .map(|abha| Identifier::new(ABHA_IDENTIFIER_SYSTEM, abha.as_str()))
            .collect(),
        name: vec![HumanName::text(details.name.trim())],
        gender: details.gender.clone(),
        birth_date: details.birth_date.clone(),
    }
}

fn organization(code: &str, name: Option<&str>) -> Organization {
    Organization {
        id: Some(new_id()),
        identifier: vec![Identifier::new(PARTICIPANT_CODE_SYSTEM, code)],
        name: Some(name.unwrap_or(code).to_string()),
    }
}

fn coverage(policy_number: &str, patient_id: &str, payer_id: &str) -> Coverage {
    Coverage {
        id: Some(new_id()),
        status: FinancialStatus::Active,
        coverage_type: None,
        subscriber_id: Some(policy_number.to_string()),
        beneficiary: reference_to::<Patient>(patient_id),
        payor: vec![reference_to::<Organization>(payer_id)],
    }
}

/// The resources every request bundle carries next to its focal resource.
struct Supporting {
    patient: Patient,
    provider: Organization,
    payer: Organization,
    coverage: Coverage,
}

impl Supporting {
    fn new(
        details: &PatientDetails,
        policy_number: &str,
        parties: &Parties,
        provider_name: Option<&str>,
        payer_name: Option<&str>,
    ) -> Self {
        let patient = patient(details);
        let provider = organization(&parties.provider_code, provider_name);
        let payer = organization(&parties.payer_code, payer_name);
        let coverage = coverage(
            policy_number,
            patient.id.as_deref().unwrap_or_default(),
            payer.id.as_deref().unwrap_or_default(),
        );
        Self {
            patient,
            provider,
            payer,
            coverage,
        }
    }

    fn patient_ref(&self) -> Reference {
        let reference = reference_to::<Patient>(self.patient.id.as_deref().unwrap_or_default());
        match self.patient.display_name() {
            Some(name) => reference.with_display(name),
            None => reference,
        }
    }

    fn provider_ref(&self) -> Reference {
        reference_to::<Organization>(self.provider.id.as_deref().unwrap_or_default())
    }

    fn payer_ref(&self) -> Reference {
        reference_to::<Organization>(self.payer.id.as_deref().unwrap_or_default())
    }

    fn coverage_ref(&self) -> Reference {
        reference_to::<Coverage>(self.coverage.id.as_deref().unwrap_or_default())
    }

    fn push_into(&self, bundle: &mut Bundle) -> FhirResult<()> {
        bundle.push(&self.patient)?;
        bundle.push(&self.provider)?;
        bundle.push(&self.payer)?;
        bundle.push(&self.coverage)?;
        Ok(())
    }
}

pub fn eligibility_request(form: &EligibilityForm, parties: &Parties) -> FhirResult<Bundle> {
    let supporting = Supporting::new(
        &form.patient,
        &form.policy_number,
        parties,
        form.provider_name.as_deref(),
        form.payer_name.as_deref(),
    );

    let request = CoverageEligibilityRequest {
        id: Some(new_id()),
        meta: None,
        identifier: Vec::new(),
        status: FinancialStatus::Active,
        purpose: vec![EligibilityPurpose::Validation, EligibilityPurpose::Benefits],
        patient: supporting.patient_ref(),
        created: hcx_types::ist_timestamp(),
        provider: Some(supporting.provider_ref()),
        insurer: supporting.payer_ref(),
        insurance: vec![EligibilityInsurance {
            focal: Some(true),
            coverage: supporting.coverage_ref(),
        }],
    };

    let mut bundle = Bundle::collection(Vec::new());
    bundle.push(&request)?;
    supporting.push_into(&mut bundle)?;
    Ok(bundle)
}

/// Claim or pre-authorisation bundle, depending on `claim_use`.
pub fn claim_request(
    form: &ClaimForm,
    claim_use: ClaimUse,
    parties: &Parties,
) -> FhirResult<Bundle> {
    if form.items.is_empty() {
        return Err(fhir::FhirError::InvalidInput(
            "a claim needs at least one item".into(),
        ));
    }

    let supporting = Supporting::new(
        &form.patient,
        &form.policy_number,
        parties,
        form.provider_name.as_deref(),
        form.payer_name.as_deref(),
    );

    let items = form
        .items
        .iter()
        .zip(1u32..)
        .map(|(line, sequence)| ClaimItem {
            sequence,
            product_or_service: CodeableConcept::coded(
                SERVICE_SYSTEM,
                &line.code,
                line.description.as_deref(),
            ),
            unit_price: Some(Money::inr(line.amount)),
            net: Some(Money::inr(line.amount)),
        })
        .collect();

    let claim = Claim {
        id: Some(new_id()),
        meta: None,
        identifier: vec![Identifier::new(PARTICIPANT_CODE_SYSTEM, new_id())],
        status: FinancialStatus::Active,
        claim_type: CodeableConcept::coded(
            CLAIM_TYPE_SYSTEM,
            form.claim_type.as_deref().unwrap_or("institutional"),
            None,
        ),
        claim_use,
        patient: supporting.patient_ref(),
        created: hcx_types::ist_timestamp(),
        insurer: supporting.payer_ref(),
        provider: supporting.provider_ref(),
        priority: CodeableConcept::coded(PRIORITY_SYSTEM, "normal", None),
        insurance: vec![ClaimInsurance {
            sequence: 1,
            focal: true,
            coverage: supporting.coverage_ref(),
        }],
        item: items,
        total: Some(Money::inr(form.total())),
    };

    let mut bundle = Bundle::collection(Vec::new());
    bundle.push(&claim)?;
    supporting.push_into(&mut bundle)?;
    Ok(bundle)
}

/// Response approving the eligibility request in `request`.
pub fn eligibility_response(request: &Bundle) -> FhirResult<Bundle> {
    let eligibility: CoverageEligibilityRequest = request.require()?;

    let response = CoverageEligibilityResponse {
        id: Some(new_id()),
        meta: None,
        status: FinancialStatus::Active,
        purpose: eligibility.purpose.clone(),
        patient: eligibility.patient.clone(),
        created: hcx_types::ist_timestamp(),
        request: eligibility
            .id
            .as_deref()
            .map(reference_to::<CoverageEligibilityRequest>),
        outcome: Outcome::Complete,
        disposition: Some("Policy is active and coverage is in force".into()),
        insurer: eligibility.insurer.clone(),
        insurance: eligibility
            .insurance
            .iter()
            .map(|insurance| EligibilityResponseInsurance {
                coverage: insurance.coverage.clone(),
                inforce: Some(true),
            })
            .collect(),
    };

    let mut bundle = Bundle::collection(Vec::new());
    bundle.push(&response)?;
    copy_supporting(request, &mut bundle);
    Ok(bundle)
}

/// Response approving the claim or pre-authorisation in `request` for its full amount.
pub fn claim_response(request: &Bundle) -> FhirResult<Bundle> {
    let claim: Claim = request.require()?;
    let approved = claim.claimed_total();

    let response = ClaimResponse {
        id: Some(new_id()),
        meta: None,
        identifier: Vec::new(),
        status: FinancialStatus::Active,
        claim_type: claim.claim_type.clone(),
        claim_use: claim.claim_use,
        patient: claim.patient.clone(),
        created: hcx_types::ist_timestamp(),
        insurer: claim.insurer.clone(),
        requestor: Some(claim.provider.clone()),
        request: claim.id.as_deref().map(reference_to::<Claim>),
        outcome: Outcome::Complete,
        disposition: Some(match claim.claim_use {
            ClaimUse::Preauthorization => "Pre-authorisation approved".into(),
            _ => "Claim settled in full".into(),
        }),
        pre_auth_ref: (claim.claim_use == ClaimUse::Preauthorization)
            .then(|| format!("PA-{}", &new_id()[..8].to_uppercase())),
        total: vec![
            ClaimResponseTotal {
                category: CodeableConcept::coded(ADJUDICATION_SYSTEM, "submitted", None),
                amount: approved.clone(),
            },
            ClaimResponseTotal {
                category: CodeableConcept::coded(ADJUDICATION_SYSTEM, "benefit", None),
                amount: approved,
            },
        ],
    };

    let mut bundle = Bundle::collection(Vec::new());
    bundle.push(&response)?;
    copy_supporting(request, &mut bundle);
    Ok(bundle)
}

/// Payer request for more information.
pub fn communication_request(form: &CommunicationForm, parties: &Parties) -> FhirResult<Bundle> {
    if form.message.trim().is_empty() {
        return Err(fhir::FhirError::InvalidInput(
            "communication message is empty".into(),
        ));
    }

    let payer = organization(&parties.payer_code, None);
    let provider = organization(&parties.provider_code, None);

    let communication = Communication {
        id: Some(new_id()),
        status: CommunicationStatus::Completed,
        category: vec![CodeableConcept::coded(
            COMMUNICATION_CATEGORY_SYSTEM,
            "instruction",
            Some("Request for additional information"),
        )],
        about: form
            .claim_reference
            .iter()
            .map(|r| Reference {
                reference: Some(r.clone()),
                display: None,
            })
            .collect(),
        sent: Some(hcx_types::ist_timestamp()),
        sender: Some(reference_to::<Organization>(
            payer.id.as_deref().unwrap_or_default(),
        )),
        recipient: vec![reference_to::<Organization>(
            provider.id.as_deref().unwrap_or_default(),
        )],
        payload: vec![CommunicationPayload {
            content_string: Some(form.message.trim().to_string()),
        }],
        ..Communication::default()
    };

    let mut bundle = Bundle::collection(Vec::new());
    bundle.push(&communication)?;
    bundle.push(&payer)?;
    bundle.push(&provider)?;
    Ok(bundle)
}

/// Provider answer to the communication request in `request`.
pub fn communication_reply(request: &Bundle, message: &str) -> FhirResult<Bundle> {
    let asked: Communication = request.require()?;

    let reply = Communication {
        id: Some(new_id()),
        in_response_to: asked
            .id
            .as_deref()
            .map(reference_to::<Communication>)
            .into_iter()
            .collect(),
        based_on: asked.about.clone(),
        status: CommunicationStatus::Completed,
        category: asked.category.clone(),
        subject: asked.subject.clone(),
        sent: Some(hcx_types::ist_timestamp()),
        sender: asked.recipient.first().cloned(),
        recipient: asked.sender.iter().cloned().collect(),
        payload: vec![CommunicationPayload {
            content_string: Some(message.to_string()),
        }],
        ..Communication::default()
    };

    let mut bundle = Bundle::collection(Vec::new());
    bundle.push(&reply)?;
    Ok(bundle)
}

/// Copies the patient, organisations and coverage of a request into its response.
fn copy_supporting(request: &Bundle, response: &mut Bundle) {
    let supporting = [
        Patient::RESOURCE_TYPE,
        Organization::RESOURCE_TYPE,
        Coverage::RESOURCE_TYPE,
    ];
    for entry in &request.entry {
        if entry
            .resource_type()
            .is_some_and(|t| supporting.contains(&t))
        {
            response.entry.push(entry.clone());
        }
    }
}

/// Patient display name carried by a request bundle, for logs.
pub fn patient_name(bundle: &Bundle) -> Option<String> {
    bundle
        .find::<Patient>()
        .ok()
        .flatten()
        .and_then(|p| p.display_name())
}

/// Id of the focal resource a reference points at, for logs.
pub fn referenced_id(reference: &Reference) -> &str {
    reference_id(reference).unwrap_or("<none>")
}
