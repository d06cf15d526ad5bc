use rand::{prelude::SliceRandom, Rng};

const FIRST_NAMES: [&str; 56] = [
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Christopher", "Karen", "Charles", "Nancy", "Daniel", "Lisa", "Matthew", "Betty", "Anthony",
    "Helen", "Mark", "Sandra", "Donald", "Donna", "Steven", "Carol", "Paul", "Ruth", "Andrew",
    "Sharon", "Kenneth", "Michelle", "Joshua", "Laura", "Kevin", "Sarah", "Brian", "Kimberly",
    "George", "Deborah", "Edward", "Dorothy", "Ronald", "Lisa", "Timothy", "Nancy", "Jason",
    "Karen",
];

const LAST_NAMES: [&str; 56] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans",
    "Turner", "Diaz", "Parker",
];

pub(crate) const EMAIL_DOMAIN: &str = "example.com";

/// The ways a guest's name is turned into the local part of their email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmailTemplate {
    /// first.last
    Dotted,
    /// firstlast
    Concatenated,
    /// flast
    InitialLast,
    /// firstl
    FirstInitial,
    /// first.lastNN
    DottedWithNumber,
}

impl EmailTemplate {
    const ALL: [EmailTemplate; 5] = [
        EmailTemplate::Dotted,
        EmailTemplate::Concatenated,
        EmailTemplate::InitialLast,
        EmailTemplate::FirstInitial,
        EmailTemplate::DottedWithNumber,
    ];

    fn local_part<T: Rng>(self, first: &str, last: &str, rng: &mut T) -> String {
        let (first, last) = (first.to_lowercase(), last.to_lowercase());
        match self {
            EmailTemplate::Dotted => format!("{}.{}", first, last),
            EmailTemplate::Concatenated => format!("{}{}", first, last),
            EmailTemplate::InitialLast => format!("{}{}", initial(&first), last),
            EmailTemplate::FirstInitial => format!("{}{}", first, initial(&last)),
            EmailTemplate::DottedWithNumber => {
                format!("{}.{}{}", first, last, rng.gen_range(1..=99))
            }
        }
    }
}

fn initial(name: &str) -> String {
    name.chars().next().map(String::from).unwrap_or_default()
}

/// Picks a first and a last name uniformly from fixed pools.
pub fn random_name<T: Rng>(rng: &mut T) -> (&'static str, &'static str) {
    // The pools are non-empty constants, so `choose` always yields a name.
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or(FIRST_NAMES[0]);
    let last = LAST_NAMES.choose(rng).copied().unwrap_or(LAST_NAMES[0]);
    (first, last)
}

/// Builds an `@example.com` address from the given name using a uniformly chosen template.
pub fn random_email<T: Rng>(first: &str, last: &str, rng: &mut T) -> String {
    let template = EmailTemplate::ALL[rng.gen_range(0..EmailTemplate::ALL.len())];
    format!("{}@{}", template.local_part(first, last, rng), EMAIL_DOMAIN)
}

/// A ten digit phone number that does not start with 0 or 1.
pub fn random_phone<T: Rng>(rng: &mut T) -> String {
    rng.gen_range(2_000_000_000u64..=9_999_999_999).to_string()
}

/// The identifier our reservations carry towards the API, so they are recognisable as synthetic.
pub fn random_third_party_identifier<T: Rng>(rng: &mut T) -> String {
    format!("demo-{}", rng.gen_range(10_000..=99_999))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

pub fn generate_guest<T: Rng>(rng: &mut T) -> Guest {
    let (first_name, last_name) = random_name(rng);
    let email = random_email(first_name, last_name, rng);
    let phone = random_phone(rng);
    Guest {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email,
        phone,
    }
}
