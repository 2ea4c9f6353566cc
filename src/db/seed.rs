use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// Demo company shipped with the application so the directory has something
/// to browse on first launch.
struct SeedCompany {
    name: &'static str,
    industry: &'static str,
    description: &'static str,
    location: &'static str,
    employees: u32,
    founded_year: i32,
}

const SEED_COMPANIES: &[SeedCompany] = &[
    SeedCompany {
        name: "Innovate Inc.",
        industry: "Technology",
        description: "Pioneering new technologies for a better future.",
        location: "Bangalore",
        employees: 1200,
        founded_year: 2010,
    },
    SeedCompany {
        name: "Healthful Goods",
        industry: "Healthcare",
        description: "Providing top-quality healthcare products and services.",
        location: "Mumbai",
        employees: 850,
        founded_year: 2005,
    },
    SeedCompany {
        name: "Quantum Finance",
        industry: "Finance",
        description: "Secure and smart financial solutions for everyone.",
        location: "Delhi",
        employees: 2500,
        founded_year: 1998,
    },
    SeedCompany {
        name: "GreenBuild Co.",
        industry: "Construction",
        description: "Sustainable construction for a greener planet.",
        location: "Hyderabad",
        employees: 500,
        founded_year: 2015,
    },
    SeedCompany {
        name: "EduVerse",
        industry: "Education",
        description: "Revolutionizing learning with immersive experiences.",
        location: "Chennai",
        employees: 300,
        founded_year: 2018,
    },
    SeedCompany {
        name: "RetailRight",
        industry: "Retail",
        description: "The future of personalized shopping experiences.",
        location: "Gurgaon",
        employees: 5000,
        founded_year: 2002,
    },
    SeedCompany {
        name: "AutoMotion",
        industry: "Automotive",
        description: "Leading the charge in electric vehicle technology.",
        location: "Pune",
        employees: 3200,
        founded_year: 2012,
    },
    SeedCompany {
        name: "FoodFusion",
        industry: "Food & Beverage",
        description: "Gourmet meals delivered to your doorstep.",
        location: "Noida",
        employees: 750,
        founded_year: 2016,
    },
    SeedCompany {
        name: "ConnectSphere",
        industry: "Technology",
        description: "Connecting the world, one message at a time.",
        location: "Bangalore",
        employees: 1800,
        founded_year: 2011,
    },
    SeedCompany {
        name: "BioGenetics",
        industry: "Healthcare",
        description: "Advanced genetic research for disease prevention.",
        location: "Hyderabad",
        employees: 600,
        founded_year: 2014,
    },
    SeedCompany {
        name: "CapitalTrust",
        industry: "Finance",
        description: "Your trusted partner in investment banking.",
        location: "Mumbai",
        employees: 4000,
        founded_year: 1995,
    },
    SeedCompany {
        name: "SkyHigh Homes",
        industry: "Construction",
        description: "Luxury living with an emphasis on quality.",
        location: "Goa",
        employees: 450,
        founded_year: 2008,
    },
    SeedCompany {
        name: "LearnWell",
        industry: "Education",
        description: "Online courses taught by industry experts.",
        location: "Online",
        employees: 150,
        founded_year: 2020,
    },
    SeedCompany {
        name: "ShopSmart",
        industry: "Retail",
        description: "AI-powered price comparison and deals.",
        location: "Bangalore",
        employees: 200,
        founded_year: 2019,
    },
    SeedCompany {
        name: "EVOLVE Cars",
        industry: "Automotive",
        description: "Self-driving cars for a safer tomorrow.",
        location: "Pune",
        employees: 900,
        founded_year: 2017,
    },
    SeedCompany {
        name: "FreshFarm",
        industry: "Food & Beverage",
        description: "Organic produce from local farms.",
        location: "Chandigarh",
        employees: 250,
        founded_year: 2013,
    },
    SeedCompany {
        name: "CyberDefend",
        industry: "Technology",
        description: "Next-generation cybersecurity solutions for enterprise.",
        location: "Bangalore",
        employees: 450,
        founded_year: 2016,
    },
    SeedCompany {
        name: "Nordic Energy",
        industry: "Energy",
        description: "Renewable energy solutions for a sustainable future.",
        location: "Chennai",
        employees: 1100,
        founded_year: 2009,
    },
    SeedCompany {
        name: "SilkRoad Logistics",
        industry: "Logistics",
        description: "Streamlining global supply chains with AI.",
        location: "Mumbai",
        employees: 3400,
        founded_year: 2004,
    },
    SeedCompany {
        name: "PixelPlay",
        industry: "Gaming",
        description: "Creating immersive worlds and unforgettable stories.",
        location: "Gurgaon",
        employees: 600,
        founded_year: 2012,
    },
    SeedCompany {
        name: "LuxeMode",
        industry: "Fashion",
        description: "Defining modern elegance for the digital age.",
        location: "Delhi",
        employees: 280,
        founded_year: 2018,
    },
    SeedCompany {
        name: "AeroSpace X",
        industry: "Aerospace",
        description: "Pushing the boundaries of atmospheric flight.",
        location: "Hyderabad",
        employees: 5000,
        founded_year: 1990,
    },
    SeedCompany {
        name: "Urban Grow",
        industry: "Agriculture",
        description: "Vertical farming solutions for urban environments.",
        location: "Pune",
        employees: 120,
        founded_year: 2021,
    },
    SeedCompany {
        name: "Streamline Media",
        industry: "Media",
        description: "Digital content distribution and analytics.",
        location: "Mumbai",
        employees: 800,
        founded_year: 2007,
    },
    SeedCompany {
        name: "BlueWave Consulting",
        industry: "Consulting",
        description: "Strategic business advice for global markets.",
        location: "Bangalore",
        employees: 1500,
        founded_year: 2000,
    },
    SeedCompany {
        name: "NanoHealth",
        industry: "Healthcare",
        description: "Nanotechnology applications in modern medicine.",
        location: "Hyderabad",
        employees: 400,
        founded_year: 2015,
    },
    SeedCompany {
        name: "Solaris Power",
        industry: "Energy",
        description: "Harnessing the power of the sun efficiently.",
        location: "Noida",
        employees: 950,
        founded_year: 2011,
    },
    SeedCompany {
        name: "RapidMove",
        industry: "Logistics",
        description: "Instant local delivery services.",
        location: "Bangalore",
        employees: 2200,
        founded_year: 2014,
    },
    SeedCompany {
        name: "CryptoVault",
        industry: "Finance",
        description: "Secure cold storage for digital assets.",
        location: "Mumbai",
        employees: 80,
        founded_year: 2017,
    },
    SeedCompany {
        name: "VirtualSpaces",
        industry: "Real Estate",
        description: "VR tours for luxury real estate properties.",
        location: "Gurgaon",
        employees: 150,
        founded_year: 2019,
    },
    SeedCompany {
        name: "OceanClean",
        industry: "Non-Profit",
        description: "Cleaning our oceans one mile at a time.",
        location: "Chennai",
        employees: 300,
        founded_year: 2013,
    },
    SeedCompany {
        name: "NextGen AI",
        industry: "Technology",
        description: "Artificial intelligence for business automation.",
        location: "Pune",
        employees: 550,
        founded_year: 2016,
    },
];

/// Populate an empty store with the demo companies. Ids start at 1 and follow
/// the list order; a store that already has rows is left alone. Returns the
/// number of inserted rows.
pub fn seed_companies(conn: &Connection) -> Result<usize> {
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))
        .context("failed to count companies")?;
    if existing > 0 {
        return Ok(0);
    }

    let mut stmt = conn
        .prepare(
            "INSERT INTO companies
                (id, ordinal, name, industry, description, location, employees, founded_year, logo)
             VALUES (?1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .context("failed to prepare seed insert")?;

    for (idx, seed) in SEED_COMPANIES.iter().enumerate() {
        let id = idx as i64 + 1;
        stmt.execute(params![
            id,
            seed.name,
            seed.industry,
            seed.description,
            seed.location,
            seed.employees,
            seed.founded_year,
            format!("https://picsum.photos/seed/{id}/100/100"),
        ])
        .with_context(|| format!("failed to seed {}", seed.name))?;
    }

    Ok(SEED_COMPANIES.len())
}
