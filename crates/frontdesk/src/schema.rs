//! Static registry of every entity the dashboard manages.
//!
//! Each `Schema` describes one remote record type: its wire path segment,
//! identifier field, ordered field list, uniqueness rules, and the entities
//! whose records reference it (consulted by the dependent-record guard
//! before a delete). The table is built at compile time and never mutated;
//! both the orchestrator and the guard read it.
//!
//! Path segments and field names are part of the wire contract with the
//! dataops service and must not be normalized (note the irregular plural
//! `chains`).

use std::fmt;

use serde::Serialize;

use crate::error::{FieldIssue, IssueReason};
use crate::validate::SignPolicy;
use crate::value::Payload;

/// The nine manageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Login,
    Employee,
    Chain,
    Hotel,
    RoomDescription,
    Client,
    Reserve,
    Room,
    RoomUnavailable,
}

impl EntityKind {
    pub const ALL: [Self; 9] = [
        Self::Login,
        Self::Employee,
        Self::Chain,
        Self::Hotel,
        Self::RoomDescription,
        Self::Client,
        Self::Reserve,
        Self::Room,
        Self::RoomUnavailable,
    ];

    pub fn schema(self) -> &'static Schema {
        match self {
            Self::Login => &LOGIN,
            Self::Employee => &EMPLOYEE,
            Self::Chain => &CHAIN,
            Self::Hotel => &HOTEL,
            Self::RoomDescription => &ROOM_DESCRIPTION,
            Self::Client => &CLIENT,
            Self::Reserve => &RESERVE,
            Self::Room => &ROOM,
            Self::RoomUnavailable => &ROOM_UNAVAILABLE,
        }
    }

    /// Look an entity up by its display label.
    pub fn find(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    pub fn label(self) -> &'static str {
        self.schema().label
    }

    pub fn segment(self) -> &'static str {
        self.schema().segment
    }

    pub fn id_field(self) -> &'static str {
        self.schema().id_field
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Semantic type of one field, driving validation and coercion.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Integer,
    Real(SignPolicy),
    Text,
    /// Free text that must never be echoed into logs (the password field).
    Secret,
    Choice(&'static [&'static str]),
    Date,
    Flag,
    ForeignKey(EntityKind),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

/// One entity whose records hold a foreign key into the schema that
/// declares this link. The backend exposes a `by<via>` lookup for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependentLink {
    pub entity: EntityKind,
    pub via: &'static str,
}

/// Pre-mutation lookup rules. Each one maps to a dedicated backend
/// endpoint; on update, a hit on the record's own identifier is not a
/// conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniquenessRule {
    /// One login per employee (`/dataops/login/byemployeeid/<eid>`).
    LoginEmployee,
    /// Usernames are unique (`/dataops/login/byusername`).
    LoginUsername,
    /// One reservation per (room-slot, client) pair; the quote endpoint
    /// doubles as the check and supplies the `total_cost` to embed.
    ReservationSlot,
}

pub struct Schema {
    pub label: &'static str,
    pub segment: &'static str,
    pub id_field: &'static str,
    pub fields: &'static [FieldSpec],
    pub uniqueness: &'static [UniquenessRule],
    pub dependents: &'static [DependentLink],
    /// Cross-field rule applied after every field coerces cleanly.
    pub refine: Option<fn(&Payload) -> Vec<FieldIssue>>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub const POSITIONS: [&str; 3] = ["Administrator", "Regular", "Supervisor"];

pub const PAYMENT_METHODS: [&str; 5] = ["cash", "check", "credit card", "debit card", "pear pay"];

pub const ROOM_TYPES: [&str; 4] = ["Basic", "Premium", "Deluxe", "Suite"];

/// A room grade constrains which capacities and which types a
/// RoomDescription may combine with it.
pub struct RoomGrade {
    pub name: &'static str,
    pub capacities: &'static [i64],
    pub types: &'static [&'static str],
}

pub const ROOM_GRADES: [RoomGrade; 8] = [
    RoomGrade {
        name: "Standard",
        capacities: &[1],
        types: &["Basic", "Premium"],
    },
    RoomGrade {
        name: "Standard Queen",
        capacities: &[1, 2],
        types: &["Basic", "Premium", "Deluxe"],
    },
    RoomGrade {
        name: "Standard King",
        capacities: &[2],
        types: &["Basic", "Premium", "Deluxe"],
    },
    RoomGrade {
        name: "Double Queen",
        capacities: &[4],
        types: &["Basic", "Premium", "Deluxe"],
    },
    RoomGrade {
        name: "Double King",
        capacities: &[4, 6],
        types: &["Basic", "Premium", "Deluxe", "Suite"],
    },
    RoomGrade {
        name: "Triple King",
        capacities: &[6],
        types: &["Deluxe", "Suite"],
    },
    RoomGrade {
        name: "Executive Family",
        capacities: &[4, 6, 8],
        types: &["Deluxe", "Suite"],
    },
    RoomGrade {
        name: "Presidential",
        capacities: &[4, 6, 8],
        types: &["Suite"],
    },
];

pub const ROOM_GRADE_NAMES: [&str; 8] = [
    "Standard",
    "Standard Queen",
    "Standard King",
    "Double Queen",
    "Double King",
    "Triple King",
    "Executive Family",
    "Presidential",
];

static LOGIN: Schema = Schema {
    label: "Login",
    segment: "login",
    id_field: "lid",
    fields: &[
        FieldSpec {
            name: "eid",
            ty: FieldType::ForeignKey(EntityKind::Employee),
            required: true,
        },
        FieldSpec {
            name: "username",
            ty: FieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "password",
            ty: FieldType::Secret,
            required: true,
        },
    ],
    uniqueness: &[UniquenessRule::LoginEmployee, UniquenessRule::LoginUsername],
    dependents: &[],
    refine: None,
};

static EMPLOYEE: Schema = Schema {
    label: "Employee",
    segment: "employee",
    id_field: "eid",
    fields: &[
        FieldSpec {
            name: "hid",
            ty: FieldType::ForeignKey(EntityKind::Hotel),
            required: true,
        },
        FieldSpec {
            name: "fname",
            ty: FieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "lname",
            ty: FieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "age",
            ty: FieldType::Integer,
            required: true,
        },
        FieldSpec {
            name: "position",
            ty: FieldType::Choice(&POSITIONS),
            required: true,
        },
        FieldSpec {
            name: "salary",
            ty: FieldType::Real(SignPolicy::NonNegative),
            required: true,
        },
    ],
    uniqueness: &[],
    dependents: &[DependentLink {
        entity: EntityKind::Login,
        via: "eid",
    }],
    refine: None,
};

static CHAIN: Schema = Schema {
    label: "Chain",
    segment: "chains",
    id_field: "chid",
    fields: &[
        FieldSpec {
            name: "cname",
            ty: FieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "springmkup",
            ty: FieldType::Real(SignPolicy::NonNegative),
            required: true,
        },
        FieldSpec {
            name: "summermkup",
            ty: FieldType::Real(SignPolicy::NonNegative),
            required: true,
        },
        FieldSpec {
            name: "wintermkup",
            ty: FieldType::Real(SignPolicy::NonNegative),
            required: true,
        },
        FieldSpec {
            name: "fallmkup",
            ty: FieldType::Real(SignPolicy::NonNegative),
            required: true,
        },
    ],
    uniqueness: &[],
    dependents: &[DependentLink {
        entity: EntityKind::Hotel,
        via: "chid",
    }],
    refine: None,
};

static HOTEL: Schema = Schema {
    label: "Hotel",
    segment: "hotel",
    id_field: "hid",
    fields: &[
        FieldSpec {
            name: "chid",
            ty: FieldType::ForeignKey(EntityKind::Chain),
            required: true,
        },
        FieldSpec {
            name: "hname",
            ty: FieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "hcity",
            ty: FieldType::Text,
            required: true,
        },
    ],
    uniqueness: &[],
    dependents: &[
        DependentLink {
            entity: EntityKind::Employee,
            via: "hid",
        },
        DependentLink {
            entity: EntityKind::Room,
            via: "hid",
        },
    ],
    refine: None,
};

static ROOM_DESCRIPTION: Schema = Schema {
    label: "Room Description",
    segment: "roomdescription",
    id_field: "rdid",
    fields: &[
        FieldSpec {
            name: "rname",
            ty: FieldType::Choice(&ROOM_GRADE_NAMES),
            required: true,
        },
        FieldSpec {
            name: "rtype",
            ty: FieldType::Choice(&ROOM_TYPES),
            required: true,
        },
        FieldSpec {
            name: "capacity",
            ty: FieldType::Integer,
            required: true,
        },
        FieldSpec {
            name: "ishandicap",
            ty: FieldType::Flag,
            required: true,
        },
    ],
    uniqueness: &[],
    dependents: &[DependentLink {
        entity: EntityKind::Room,
        via: "rdid",
    }],
    refine: Some(refine_room_description),
};

static CLIENT: Schema = Schema {
    label: "Client",
    segment: "client",
    id_field: "clid",
    fields: &[
        FieldSpec {
            name: "fname",
            ty: FieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "lname",
            ty: FieldType::Text,
            required: true,
        },
        FieldSpec {
            name: "age",
            ty: FieldType::Integer,
            required: true,
        },
        FieldSpec {
            name: "memberyear",
            ty: FieldType::Integer,
            required: true,
        },
    ],
    uniqueness: &[],
    dependents: &[DependentLink {
        entity: EntityKind::Reserve,
        via: "clid",
    }],
    refine: None,
};

static RESERVE: Schema = Schema {
    label: "Reserve",
    segment: "reserve",
    id_field: "reid",
    fields: &[
        FieldSpec {
            name: "ruid",
            ty: FieldType::ForeignKey(EntityKind::RoomUnavailable),
            required: true,
        },
        FieldSpec {
            name: "clid",
            ty: FieldType::ForeignKey(EntityKind::Client),
            required: true,
        },
        FieldSpec {
            name: "payment",
            ty: FieldType::Choice(&PAYMENT_METHODS),
            required: true,
        },
        FieldSpec {
            name: "guests",
            ty: FieldType::Integer,
            required: true,
        },
    ],
    uniqueness: &[UniquenessRule::ReservationSlot],
    dependents: &[],
    refine: None,
};

static ROOM: Schema = Schema {
    label: "Room",
    segment: "room",
    id_field: "rid",
    fields: &[
        FieldSpec {
            name: "hid",
            ty: FieldType::ForeignKey(EntityKind::Hotel),
            required: true,
        },
        FieldSpec {
            name: "rdid",
            ty: FieldType::ForeignKey(EntityKind::RoomDescription),
            required: true,
        },
        FieldSpec {
            name: "rprice",
            ty: FieldType::Real(SignPolicy::NonNegative),
            required: true,
        },
    ],
    uniqueness: &[],
    dependents: &[DependentLink {
        entity: EntityKind::RoomUnavailable,
        via: "rid",
    }],
    refine: None,
};

static ROOM_UNAVAILABLE: Schema = Schema {
    label: "Room Unavailable",
    segment: "roomunavailable",
    id_field: "ruid",
    fields: &[
        FieldSpec {
            name: "rid",
            ty: FieldType::ForeignKey(EntityKind::Room),
            required: true,
        },
        FieldSpec {
            name: "startdate",
            ty: FieldType::Date,
            required: true,
        },
        FieldSpec {
            name: "enddate",
            ty: FieldType::Date,
            required: true,
        },
    ],
    uniqueness: &[],
    dependents: &[DependentLink {
        entity: EntityKind::Reserve,
        via: "ruid",
    }],
    refine: Some(refine_room_unavailable),
};

fn refine_room_description(payload: &Payload) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    if let (Some(rname), Some(rtype), Some(capacity)) = (
        payload.text("rname"),
        payload.text("rtype"),
        payload.integer("capacity"),
    ) {
        if let Some(grade) = ROOM_GRADES.iter().find(|g| g.name == rname) {
            if !grade.capacities.contains(&capacity) {
                issues.push(FieldIssue {
                    field: "capacity",
                    reason: IssueReason::GradeMismatch,
                });
            }
            if !grade.types.contains(&rtype) {
                issues.push(FieldIssue {
                    field: "rtype",
                    reason: IssueReason::GradeMismatch,
                });
            }
        }
    }
    issues
}

fn refine_room_unavailable(payload: &Payload) -> Vec<FieldIssue> {
    match (payload.date("startdate"), payload.date("enddate")) {
        (Some(start), Some(end)) if end < start => vec![FieldIssue {
            field: "enddate",
            reason: IssueReason::EndBeforeStart,
        }],
        _ => Vec::new(),
    }
}
