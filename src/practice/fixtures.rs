//! Seed collections loaded into each record store at startup.

use super::{
    Client, ClientStatus, ClientType, Contract, ContractStatus, ContractType, EntityStatus, EntityType,
    KnowledgeCategory, KnowledgeItem, KnowledgeStatus, LegalEntity, Matter, MatterStatus, MatterType, Officer,
    Priority, SpendCategory, SpendLine, SpendStatus,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[allow(clippy::too_many_arguments)]
fn matter(
    id: &str,
    title: &str,
    client: &str,
    matter_type: MatterType,
    status: MatterStatus,
    priority: Priority,
    assigned_to: &str,
    start_date: &str,
    due_date: Option<&str>,
    estimated_value: f64,
    hours_logged: f64,
    tags: &[&str],
) -> Matter {
    Matter {
        id: id.to_string(),
        title: title.to_string(),
        client: client.to_string(),
        matter_type,
        status,
        priority,
        assigned_to: assigned_to.to_string(),
        start_date: start_date.to_string(),
        due_date: due_date.map(ToString::to_string),
        estimated_value,
        hours_logged,
        description: None,
        tags: strings(tags),
    }
}

pub fn matters() -> Vec<Matter> {
    let mut matters = vec![
        matter(
            "MAT-001",
            "Acme Corp v. Globex Industries",
            "Acme Corporation",
            MatterType::Litigation,
            MatterStatus::Active,
            Priority::High,
            "Sarah Johnson",
            "2024-01-15",
            Some("2024-09-30"),
            250000.0,
            142.5,
            &["breach of contract", "discovery"],
        ),
        matter(
            "MAT-002",
            "Series B Financing",
            "Northwind Ventures",
            MatterType::Corporate,
            MatterStatus::Pending,
            Priority::Medium,
            "Michael Chen",
            "2024-02-01",
            Some("2024-05-15"),
            180000.0,
            64.0,
            &["financing"],
        ),
        matter(
            "MAT-003",
            "Trademark Portfolio Review",
            "Initech LLC",
            MatterType::IntellectualProperty,
            MatterStatus::Active,
            Priority::Low,
            "Emily Rodriguez",
            "2024-03-10",
            None,
            45000.0,
            22.25,
            &["trademark"],
        ),
        matter(
            "MAT-004",
            "Wrongful Termination Defense",
            "Acme Corporation",
            MatterType::Employment,
            MatterStatus::OnHold,
            Priority::Critical,
            "David Kim",
            "2023-11-20",
            Some("2024-07-01"),
            95000.0,
            88.75,
            &["employment", "defense"],
        ),
        matter(
            "MAT-005",
            "Data Privacy Compliance Audit",
            "Umbrella Health",
            MatterType::Regulatory,
            MatterStatus::Active,
            Priority::High,
            "Sarah Johnson",
            "2024-04-02",
            Some("2024-08-31"),
            120000.0,
            37.0,
            &["gdpr", "privacy"],
        ),
        matter(
            "MAT-006",
            "Harbor Street Lease Dispute",
            "Stark Properties",
            MatterType::RealEstate,
            MatterStatus::Closed,
            Priority::Medium,
            "Michael Chen",
            "2023-06-05",
            Some("2024-01-31"),
            60000.0,
            110.0,
            &["lease"],
        ),
    ];
    matters[0].description = text("Breach of supply agreement and misappropriation claims.");
    matters[4].description = text("Gap assessment against GDPR and state privacy statutes.");
    matters
}

#[allow(clippy::too_many_arguments)]
fn contract(
    id: &str,
    title: &str,
    client: &str,
    contract_type: ContractType,
    status: ContractStatus,
    value: f64,
    start_date: &str,
    end_date: &str,
    risk_level: Priority,
    owner: &str,
    ai_insights: &[&str],
) -> Contract {
    Contract {
        id: id.to_string(),
        title: title.to_string(),
        client: client.to_string(),
        contract_type,
        status,
        value,
        start_date: start_date.to_string(),
        end_date: text(end_date),
        risk_level,
        owner: text(owner),
        tags: Vec::new(),
        ai_insights: strings(ai_insights),
    }
}

pub fn contracts() -> Vec<Contract> {
    vec![
        contract(
            "CON-001",
            "Synergize Scalable Platforms",
            "Hettinger Group",
            ContractType::ServiceAgreement,
            ContractStatus::Executed,
            952530.93,
            "2023-03-01",
            "2025-02-28",
            Priority::Medium,
            "Sarah Johnson",
            &["Auto-renewal clause triggers 60 days before term end"],
        ),
        contract(
            "CON-002",
            "Whiteboard Compelling Architectures",
            "Kuhn and Sons",
            ContractType::Employment,
            ContractStatus::Executed,
            605863.88,
            "2023-06-15",
            "2026-06-14",
            Priority::Low,
            "David Kim",
            &["Non-compete scope exceeds 12 months"],
        ),
        contract(
            "CON-003",
            "Enable Robust Infrastructures",
            "Bauch Partners",
            ContractType::Vendor,
            ContractStatus::Pending,
            867663.51,
            "2024-02-01",
            "2026-01-31",
            Priority::High,
            "Michael Chen",
            &["Uncapped indemnity for data breaches", "No limitation of liability"],
        ),
        contract(
            "CON-004",
            "Leverage Impactful Models",
            "Okuneva Holdings",
            ContractType::Employment,
            ContractStatus::Pending,
            565513.2,
            "2024-03-20",
            "2027-03-19",
            Priority::Medium,
            "David Kim",
            &["Severance terms differ from standard template"],
        ),
        contract(
            "CON-005",
            "Streamline Dynamic Channels",
            "Schowalter Inc",
            ContractType::Nda,
            ContractStatus::Draft,
            416154.07,
            "2024-04-05",
            "2025-04-04",
            Priority::Low,
            "Emily Rodriguez",
            &["Mutual obligations are balanced"],
        ),
        contract(
            "CON-006",
            "Optimize Turnkey Solutions",
            "Mraz Logistics",
            ContractType::Lease,
            ContractStatus::Expired,
            39093.04,
            "2021-01-01",
            "2023-12-31",
            Priority::Critical,
            "Michael Chen",
            &["Holdover rent accruing at 150% of base"],
        ),
        contract(
            "CON-007",
            "Generate Integrated Synergies",
            "Wehner Ventures",
            ContractType::Employment,
            ContractStatus::Executed,
            148365.01,
            "2022-09-01",
            "2025-08-31",
            Priority::Low,
            "Sarah Johnson",
            &["Equity vesting accelerates on change of control"],
        ),
        contract(
            "CON-008",
            "Harness Vertical Paradigms",
            "Gleason Media",
            ContractType::License,
            ContractStatus::Draft,
            835912.37,
            "2024-05-01",
            "2029-04-30",
            Priority::High,
            "Emily Rodriguez",
            &["Sublicensing rights are undefined", "Royalty audit window is 90 days"],
        ),
    ]
}

pub fn clients() -> Vec<Client> {
    vec![
        Client {
            id: "CLI-001".to_string(),
            name: "Acme Corporation".to_string(),
            industry: "Manufacturing".to_string(),
            client_type: ClientType::Corporate,
            status: ClientStatus::Active,
            contact_name: text("Wile Coyote"),
            contact_email: text("legal@acme.example"),
            relationship_partner: text("Sarah Johnson"),
            total_billed: 1_245_000.0,
            active_matters: 2.0,
            risk_level: Priority::Medium,
            client_since: "2018-04-12".to_string(),
            tags: strings(&["key account"]),
        },
        Client {
            id: "CLI-002".to_string(),
            name: "Initech LLC".to_string(),
            industry: "Software".to_string(),
            client_type: ClientType::Corporate,
            status: ClientStatus::Active,
            contact_name: text("Bill Lumbergh"),
            contact_email: text("counsel@initech.example"),
            relationship_partner: text("Emily Rodriguez"),
            total_billed: 310_500.0,
            active_matters: 1.0,
            risk_level: Priority::Low,
            client_since: "2021-09-01".to_string(),
            tags: Vec::new(),
        },
        Client {
            id: "CLI-003".to_string(),
            name: "City of Springfield".to_string(),
            industry: "Public Sector".to_string(),
            client_type: ClientType::Government,
            status: ClientStatus::Inactive,
            contact_name: text("Joe Quimby"),
            contact_email: None,
            relationship_partner: text("Michael Chen"),
            total_billed: 88_000.0,
            active_matters: 0.0,
            risk_level: Priority::High,
            client_since: "2016-02-20".to_string(),
            tags: strings(&["procurement"]),
        },
        Client {
            id: "CLI-004".to_string(),
            name: "Helping Hands Foundation".to_string(),
            industry: "Charity".to_string(),
            client_type: ClientType::Nonprofit,
            status: ClientStatus::Prospect,
            contact_name: None,
            contact_email: text("director@helpinghands.example"),
            relationship_partner: None,
            total_billed: 0.0,
            active_matters: 0.0,
            risk_level: Priority::Low,
            client_since: "2024-05-02".to_string(),
            tags: strings(&["pro bono"]),
        },
        Client {
            id: "CLI-005".to_string(),
            name: "Jordan Ellis".to_string(),
            industry: "Private Wealth".to_string(),
            client_type: ClientType::Individual,
            status: ClientStatus::Active,
            contact_name: text("Jordan Ellis"),
            contact_email: None,
            relationship_partner: text("David Kim"),
            total_billed: 42_750.0,
            active_matters: 1.0,
            risk_level: Priority::Critical,
            client_since: "2022-11-15".to_string(),
            tags: strings(&["estate planning"]),
        },
    ]
}

fn officers(entries: &[(&str, &str)]) -> Vec<Officer> {
    entries
        .iter()
        .map(|(name, role)| Officer {
            name: name.to_string(),
            role: role.to_string(),
        })
        .collect()
}

pub fn entities() -> Vec<LegalEntity> {
    vec![
        LegalEntity {
            id: "ENT-001".to_string(),
            name: "Acme Holdings Inc.".to_string(),
            entity_type: EntityType::Corporation,
            jurisdiction: "Delaware".to_string(),
            status: EntityStatus::Active,
            registration_number: "DE-4471023".to_string(),
            incorporation_date: "2009-03-17".to_string(),
            parent_entity: None,
            officers: officers(&[("Wile Coyote", "CEO"), ("Ada Park", "Secretary")]),
            compliance_score: 96.0,
            next_filing_date: Some("2025-03-01".to_string()),
        },
        LegalEntity {
            id: "ENT-002".to_string(),
            name: "Acme Europe GmbH".to_string(),
            entity_type: EntityType::Subsidiary,
            jurisdiction: "Germany".to_string(),
            status: EntityStatus::Active,
            registration_number: "HRB-208811".to_string(),
            incorporation_date: "2014-07-01".to_string(),
            parent_entity: Some("ENT-001".to_string()),
            officers: officers(&[("Jonas Weber", "Managing Director")]),
            compliance_score: 88.5,
            next_filing_date: Some("2024-12-31".to_string()),
        },
        LegalEntity {
            id: "ENT-003".to_string(),
            name: "Northwind Capital Partners LP".to_string(),
            entity_type: EntityType::Partnership,
            jurisdiction: "Delaware".to_string(),
            status: EntityStatus::Pending,
            registration_number: "DE-7730154".to_string(),
            incorporation_date: "2024-05-20".to_string(),
            parent_entity: None,
            officers: officers(&[("Priya Natarajan", "General Partner")]),
            compliance_score: 72.0,
            next_filing_date: None,
        },
        LegalEntity {
            id: "ENT-004".to_string(),
            name: "Initech Services LLC".to_string(),
            entity_type: EntityType::Llc,
            jurisdiction: "Texas".to_string(),
            status: EntityStatus::Dormant,
            registration_number: "TX-0801920".to_string(),
            incorporation_date: "2012-10-09".to_string(),
            parent_entity: None,
            officers: Vec::new(),
            compliance_score: 54.0,
            next_filing_date: Some("2024-08-15".to_string()),
        },
        LegalEntity {
            id: "ENT-005".to_string(),
            name: "Ellis Family Trust".to_string(),
            entity_type: EntityType::Trust,
            jurisdiction: "New York".to_string(),
            status: EntityStatus::Dissolved,
            registration_number: "NY-3319027".to_string(),
            incorporation_date: "2001-01-22".to_string(),
            parent_entity: None,
            officers: officers(&[("Jordan Ellis", "Trustee")]),
            compliance_score: 100.0,
            next_filing_date: None,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn knowledge(
    id: &str,
    title: &str,
    category: KnowledgeCategory,
    status: KnowledgeStatus,
    practice_area: &str,
    author: &str,
    summary: &str,
    updated_at: &str,
    views: f64,
    tags: &[&str],
) -> KnowledgeItem {
    KnowledgeItem {
        id: id.to_string(),
        title: title.to_string(),
        category,
        status,
        practice_area: practice_area.to_string(),
        author: author.to_string(),
        summary: summary.to_string(),
        updated_at: updated_at.to_string(),
        views,
        tags: strings(tags),
    }
}

pub fn knowledge_items() -> Vec<KnowledgeItem> {
    vec![
        knowledge(
            "KNW-001",
            "Supply Agreement Precedent",
            KnowledgeCategory::Precedent,
            KnowledgeStatus::Published,
            "Commercial",
            "Sarah Johnson",
            "Annotated supply agreement with negotiated force majeure and termination rights.",
            "2024-04-18",
            412.0,
            &["supply", "commercial"],
        ),
        knowledge(
            "KNW-002",
            "Mutual NDA Template",
            KnowledgeCategory::Template,
            KnowledgeStatus::Published,
            "Commercial",
            "Emily Rodriguez",
            "Standard two-way confidentiality agreement for early-stage discussions.",
            "2024-02-02",
            1288.0,
            &["nda"],
        ),
        knowledge(
            "KNW-003",
            "Remote Work Policy Memo",
            KnowledgeCategory::Memo,
            KnowledgeStatus::Draft,
            "Employment",
            "David Kim",
            "Cross-border tax and payroll exposure for remote employees.",
            "2024-05-27",
            36.0,
            &["remote work", "payroll"],
        ),
        knowledge(
            "KNW-004",
            "Litigation Hold Guide",
            KnowledgeCategory::Guide,
            KnowledgeStatus::Published,
            "Litigation",
            "Michael Chen",
            "Issuing, tracking and releasing preservation notices.",
            "2023-11-09",
            654.0,
            &["discovery"],
        ),
        knowledge(
            "KNW-005",
            "M&A Closing Checklist",
            KnowledgeCategory::Checklist,
            KnowledgeStatus::Archived,
            "Corporate",
            "Priya Natarajan",
            "Closing deliverables for stock purchase transactions.",
            "2022-08-30",
            903.0,
            &["m&a", "closing"],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn spend(
    id: &str,
    vendor: &str,
    matter: &str,
    description: &str,
    category: SpendCategory,
    status: SpendStatus,
    amount: f64,
    budget: f64,
    invoice_date: &str,
) -> SpendLine {
    SpendLine {
        id: id.to_string(),
        vendor: vendor.to_string(),
        matter: matter.to_string(),
        description: description.to_string(),
        category,
        status,
        amount,
        budget,
        invoice_date: invoice_date.to_string(),
    }
}

pub fn spend_lines() -> Vec<SpendLine> {
    vec![
        spend(
            "SPD-001",
            "Baker & Whitfield LLP",
            "Acme Corp v. Globex Industries",
            "Local counsel for deposition week",
            SpendCategory::LegalFees,
            SpendStatus::Approved,
            48_200.0,
            60_000.0,
            "2024-04-30",
        ),
        spend(
            "SPD-002",
            "Forensic Economics Group",
            "Acme Corp v. Globex Industries",
            "Damages model and expert report",
            SpendCategory::ExpertWitness,
            SpendStatus::Pending,
            27_500.0,
            25_000.0,
            "2024-05-15",
        ),
        spend(
            "SPD-003",
            "Superior Court Clerk",
            "Harbor Street Lease Dispute",
            "Motion filing fees",
            SpendCategory::FilingFees,
            SpendStatus::Paid,
            1_350.0,
            2_000.0,
            "2023-09-12",
        ),
        spend(
            "SPD-004",
            "Veritext",
            "Wrongful Termination Defense",
            "Court reporter and transcripts",
            SpendCategory::CourtCosts,
            SpendStatus::Disputed,
            6_875.4,
            5_000.0,
            "2024-03-08",
        ),
        spend(
            "SPD-005",
            "Summit Travel",
            "Data Privacy Compliance Audit",
            "Site visits to the Dublin data center",
            SpendCategory::Travel,
            SpendStatus::Approved,
            4_120.75,
            6_000.0,
            "2024-05-21",
        ),
    ]
}
